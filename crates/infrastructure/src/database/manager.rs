use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use leadflow_config::DatabaseConfig;
use leadflow_domain::repositories::{
    AgentRepository, ClientRepository, FollowupTaskRepository, LeadRepository, TemplateRepository,
};
use leadflow_errors::LeadflowResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::sqlite::{
    SqliteAgentRepository, SqliteClientRepository, SqliteFollowupTaskRepository,
    SqliteLeadRepository, SqliteTemplateRepository,
};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        phone TEXT,
        email TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT,
        agent_id TEXT REFERENCES profiles(id) ON DELETE SET NULL,
        client_type TEXT,
        preferred_locations TEXT NOT NULL DEFAULT '[]',
        budget_min REAL,
        budget_max REAL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS email_templates (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        subject TEXT NOT NULL,
        body TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS followup_tasks (
        id TEXT PRIMARY KEY,
        client_id TEXT REFERENCES clients(id) ON DELETE SET NULL,
        template_id TEXT REFERENCES email_templates(id) ON DELETE SET NULL,
        trigger_type TEXT NOT NULL,
        trigger_value REAL,
        scheduled_for TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        sent_at TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leads (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        source TEXT NOT NULL DEFAULT 'other',
        status TEXT NOT NULL DEFAULT 'new',
        interest_type TEXT,
        budget REAL,
        assigned_agent_id TEXT,
        property_id TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_followup_tasks_due ON followup_tasks(status, scheduled_for)",
    "CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at)",
];

/// Owns the SQLite pool and hands out repositories that share it.
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> LeadflowResult<Self> {
        debug!("Connecting to SQLite database at: {}", config.url);

        let mut connect_options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each connection to `:memory:` is a separate database, so an in-memory
        // store is pinned to one connection that is never recycled.
        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect_with(connect_options)
            .await?;

        let manager = Self { pool };
        manager.migrate().await?;
        info!(database.url = %config.url, "Database ready");
        Ok(manager)
    }

    /// Fresh private database, used by tests and dry runs.
    pub async fn in_memory() -> LeadflowResult<Self> {
        Self::new(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        })
        .await
    }

    /// Creates any missing tables and indexes. Safe to run repeatedly.
    pub async fn migrate(&self) -> LeadflowResult<()> {
        debug!("Running SQLite database migrations");
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> LeadflowResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await
    }

    pub fn followup_task_repository(&self) -> Arc<dyn FollowupTaskRepository> {
        Arc::new(SqliteFollowupTaskRepository::new(self.pool.clone()))
    }

    pub fn client_repository(&self) -> Arc<dyn ClientRepository> {
        Arc::new(SqliteClientRepository::new(self.pool.clone()))
    }

    pub fn template_repository(&self) -> Arc<dyn TemplateRepository> {
        Arc::new(SqliteTemplateRepository::new(self.pool.clone()))
    }

    pub fn agent_repository(&self) -> Arc<dyn AgentRepository> {
        Arc::new(SqliteAgentRepository::new(self.pool.clone()))
    }

    pub fn lead_repository(&self) -> Arc<dyn LeadRepository> {
        Arc::new(SqliteLeadRepository::new(self.pool.clone()))
    }
}
