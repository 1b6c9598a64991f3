//! Read-mostly reference data used to resolve a follow-up: clients, their
//! agents (`profiles`) and the email templates.

use async_trait::async_trait;
use leadflow_domain::{
    entities::{Agent, Client, EmailTemplate},
    repositories::{AgentRepository, ClientRepository, TemplateRepository},
};
use leadflow_errors::LeadflowResult;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::instrument;
use uuid::Uuid;

use crate::database::mapping::MappingHelpers;

pub struct SqliteClientRepository {
    pool: SqlitePool,
}

impl SqliteClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_client(row: &SqliteRow) -> LeadflowResult<Client> {
        Ok(Client {
            id: MappingHelpers::parse_uuid(row, "id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            agent_id: MappingHelpers::parse_optional_uuid(row, "agent_id")?,
            client_type: row.try_get("client_type")?,
            preferred_locations: MappingHelpers::parse_string_list(row, "preferred_locations")?,
            budget_min: row.try_get("budget_min")?,
            budget_max: row.try_get("budget_max")?,
        })
    }
}

#[async_trait]
impl ClientRepository for SqliteClientRepository {
    #[instrument(skip(self, client), fields(client.id = %client.id))]
    async fn create(&self, client: &Client) -> LeadflowResult<Client> {
        sqlx::query(
            r#"
            INSERT INTO clients
                (id, full_name, email, agent_id, client_type, preferred_locations,
                 budget_min, budget_max)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(client.id.to_string())
        .bind(&client.full_name)
        .bind(&client.email)
        .bind(client.agent_id.map(|id| id.to_string()))
        .bind(&client.client_type)
        .bind(MappingHelpers::encode_string_list(&client.preferred_locations)?)
        .bind(client.budget_min)
        .bind(client.budget_max)
        .execute(&self.pool)
        .await?;

        Ok(client.clone())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Client>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, agent_id, client_type, preferred_locations,
                   budget_min, budget_max
            FROM clients WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_client).transpose()
    }
}

pub struct SqliteTemplateRepository {
    pool: SqlitePool,
}

impl SqliteTemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateRepository for SqliteTemplateRepository {
    async fn create(&self, template: &EmailTemplate) -> LeadflowResult<EmailTemplate> {
        sqlx::query("INSERT INTO email_templates (id, name, subject, body) VALUES (?, ?, ?, ?)")
            .bind(template.id.to_string())
            .bind(&template.name)
            .bind(&template.subject)
            .bind(&template.body)
            .execute(&self.pool)
            .await?;

        Ok(template.clone())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<EmailTemplate>> {
        let row = sqlx::query("SELECT id, name, subject, body FROM email_templates WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(EmailTemplate {
                id: MappingHelpers::parse_uuid(&row, "id")?,
                name: row.try_get("name")?,
                subject: row.try_get("subject")?,
                body: row.try_get("body")?,
            })),
            None => Ok(None),
        }
    }
}

pub struct SqliteAgentRepository {
    pool: SqlitePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for SqliteAgentRepository {
    async fn create(&self, agent: &Agent) -> LeadflowResult<Agent> {
        sqlx::query("INSERT INTO profiles (id, full_name, phone, email) VALUES (?, ?, ?, ?)")
            .bind(agent.id.to_string())
            .bind(&agent.full_name)
            .bind(&agent.phone)
            .bind(&agent.email)
            .execute(&self.pool)
            .await?;

        Ok(agent.clone())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Agent>> {
        let row = sqlx::query("SELECT id, full_name, phone, email FROM profiles WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Agent {
                id: MappingHelpers::parse_uuid(&row, "id")?,
                full_name: row.try_get("full_name")?,
                phone: row.try_get("phone")?,
                email: row.try_get("email")?,
            })),
            None => Ok(None),
        }
    }
}
