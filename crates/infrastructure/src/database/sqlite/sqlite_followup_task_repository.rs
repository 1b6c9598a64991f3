use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_domain::{
    entities::{FollowupStatus, FollowupTask, TriggerType},
    repositories::{DueFollowup, FollowupTaskRepository},
};
use leadflow_errors::{LeadflowError, LeadflowResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::database::mapping::MappingHelpers;

const SELECT_COLUMNS: &str = "SELECT id, client_id, template_id, trigger_type, trigger_value, \
     scheduled_for, status, sent_at, created_at FROM followup_tasks";

pub struct SqliteFollowupTaskRepository {
    pool: SqlitePool,
}

impl SqliteFollowupTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &SqliteRow) -> LeadflowResult<FollowupTask> {
        Ok(FollowupTask {
            id: MappingHelpers::parse_uuid(row, "id")?,
            client_id: MappingHelpers::parse_optional_uuid(row, "client_id")?,
            template_id: MappingHelpers::parse_optional_uuid(row, "template_id")?,
            trigger_type: TriggerType::from(row.try_get::<String, _>("trigger_type")?),
            // Databases created before the column was REAL declare it INTEGER;
            // SQLite converts either storage class to a double on read.
            trigger_value: row.try_get_unchecked::<Option<f64>, _>("trigger_value")?,
            scheduled_for: MappingHelpers::parse_timestamp(row, "scheduled_for")?,
            status: FollowupStatus::from(row.try_get::<String, _>("status")?),
            sent_at: MappingHelpers::parse_optional_timestamp(row, "sent_at")?,
            created_at: MappingHelpers::parse_timestamp(row, "created_at")?,
        })
    }
}

#[async_trait]
impl FollowupTaskRepository for SqliteFollowupTaskRepository {
    #[instrument(skip(self, task), fields(followup.id = %task.id))]
    async fn create(&self, task: &FollowupTask) -> LeadflowResult<FollowupTask> {
        sqlx::query(
            r#"
            INSERT INTO followup_tasks
                (id, client_id, template_id, trigger_type, trigger_value,
                 scheduled_for, status, sent_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id.to_string())
        .bind(task.client_id.map(|id| id.to_string()))
        .bind(task.template_id.map(|id| id.to_string()))
        .bind(task.trigger_type.as_str())
        .bind(task.trigger_value)
        .bind(MappingHelpers::encode_timestamp(task.scheduled_for))
        .bind(task.status.as_str())
        .bind(MappingHelpers::encode_optional_timestamp(task.sent_at))
        .bind(MappingHelpers::encode_timestamp(task.created_at))
        .execute(&self.pool)
        .await?;

        debug!("Created followup task {}", task.id);
        Ok(task.clone())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<FollowupTask>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_task).transpose()
    }

    #[instrument(skip(self))]
    async fn list_due(&self, now: DateTime<Utc>) -> LeadflowResult<Vec<DueFollowup>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE status = ? AND scheduled_for <= ? \
             ORDER BY scheduled_for ASC, id ASC"
        ))
        .bind(FollowupStatus::Pending.as_str())
        .bind(MappingHelpers::encode_timestamp(now))
        .fetch_all(&self.pool)
        .await?;

        let due: Vec<DueFollowup> = rows
            .iter()
            .map(|row| match Self::row_to_task(row) {
                Ok(task) => DueFollowup::Ready(task),
                Err(e) => {
                    let id = row
                        .try_get::<Option<String>, _>("id")
                        .ok()
                        .flatten()
                        .unwrap_or_else(|| "<unknown>".to_string());
                    warn!(followup.id = %id, error = %e, "Due followup row could not be decoded");
                    DueFollowup::Unreadable {
                        id,
                        reason: e.to_string(),
                    }
                }
            })
            .collect();
        debug!("Found {} due followup tasks", due.len());
        Ok(due)
    }

    #[instrument(skip(self))]
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> LeadflowResult<()> {
        let result = sqlx::query(
            "UPDATE followup_tasks SET status = ?, sent_at = ? WHERE id = ? AND status = ?",
        )
        .bind(FollowupStatus::Sent.as_str())
        .bind(MappingHelpers::encode_timestamp(sent_at))
        .bind(id.to_string())
        .bind(FollowupStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: either the row is gone or another run got there first.
        let exists = sqlx::query("SELECT 1 FROM followup_tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if exists {
            Err(LeadflowError::FollowupAlreadyDispatched { id })
        } else {
            Err(LeadflowError::followup_not_found(id))
        }
    }
}
