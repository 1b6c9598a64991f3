use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_domain::{
    entities::{Lead, LeadSource, LeadStatus},
    repositories::LeadRepository,
};
use leadflow_errors::{LeadflowError, LeadflowResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::database::mapping::MappingHelpers;

const SELECT_COLUMNS: &str = "SELECT id, full_name, email, phone, source, status, interest_type, \
     budget, assigned_agent_id, property_id, notes, created_at, updated_at FROM leads";

pub struct SqliteLeadRepository {
    pool: SqlitePool,
}

impl SqliteLeadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_lead(row: &SqliteRow) -> LeadflowResult<Lead> {
        Ok(Lead {
            id: MappingHelpers::parse_uuid(row, "id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            source: LeadSource::from(row.try_get::<String, _>("source")?),
            status: LeadStatus::from(row.try_get::<String, _>("status")?),
            interest_type: row.try_get("interest_type")?,
            budget: row.try_get("budget")?,
            assigned_agent_id: MappingHelpers::parse_optional_uuid(row, "assigned_agent_id")?,
            property_id: MappingHelpers::parse_optional_uuid(row, "property_id")?,
            notes: row.try_get("notes")?,
            created_at: MappingHelpers::parse_timestamp(row, "created_at")?,
            updated_at: MappingHelpers::parse_timestamp(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl LeadRepository for SqliteLeadRepository {
    #[instrument(skip(self, lead), fields(lead.id = %lead.id))]
    async fn create(&self, lead: &Lead) -> LeadflowResult<Lead> {
        sqlx::query(
            r#"
            INSERT INTO leads
                (id, full_name, email, phone, source, status, interest_type, budget,
                 assigned_agent_id, property_id, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(lead.id.to_string())
        .bind(&lead.full_name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(lead.source.as_str())
        .bind(lead.status.as_str())
        .bind(&lead.interest_type)
        .bind(lead.budget)
        .bind(lead.assigned_agent_id.map(|id| id.to_string()))
        .bind(lead.property_id.map(|id| id.to_string()))
        .bind(&lead.notes)
        .bind(MappingHelpers::encode_timestamp(lead.created_at))
        .bind(MappingHelpers::encode_timestamp(lead.updated_at))
        .execute(&self.pool)
        .await?;

        debug!("Created lead {}", lead.id);
        Ok(lead.clone())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Lead>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_lead).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> LeadflowResult<Vec<Lead>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_lead).collect()
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: Uuid,
        status: &LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> LeadflowResult<Lead> {
        let result = sqlx::query("UPDATE leads SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(MappingHelpers::encode_timestamp(updated_at))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LeadflowError::lead_not_found(id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| LeadflowError::lead_not_found(id))
    }
}
