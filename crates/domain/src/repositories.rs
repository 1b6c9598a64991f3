//! Store ports consumed by the dispatcher and the lead pipeline.
//!
//! The dispatcher depends only on these traits, so a batch run can be driven
//! against SQLite in production and against in-memory fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_errors::LeadflowResult;
use uuid::Uuid;

use crate::entities::{Agent, Client, EmailTemplate, FollowupTask, Lead, LeadStatus};

/// One entry of the due listing.
#[derive(Debug, Clone, PartialEq)]
pub enum DueFollowup {
    Ready(FollowupTask),
    /// The stored row is malformed. `id` is the raw id column as text.
    Unreadable { id: String, reason: String },
}

impl DueFollowup {
    pub fn into_task(self) -> Option<FollowupTask> {
        match self {
            DueFollowup::Ready(task) => Some(task),
            DueFollowup::Unreadable { .. } => None,
        }
    }
}

#[async_trait]
pub trait FollowupTaskRepository: Send + Sync {
    async fn create(&self, task: &FollowupTask) -> LeadflowResult<FollowupTask>;
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<FollowupTask>>;
    /// Rows with `status = pending AND scheduled_for <= now`, oldest first.
    /// `Err` only when the query itself fails; a row that cannot be decoded
    /// comes back as [`DueFollowup::Unreadable`].
    async fn list_due(&self, now: DateTime<Utc>) -> LeadflowResult<Vec<DueFollowup>>;
    /// Conditional `pending -> sent` transition. Fails with
    /// `FollowupAlreadyDispatched` if another runner got there first.
    async fn mark_sent(&self, id: Uuid, sent_at: DateTime<Utc>) -> LeadflowResult<()>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, client: &Client) -> LeadflowResult<Client>;
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Client>>;
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: &EmailTemplate) -> LeadflowResult<EmailTemplate>;
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<EmailTemplate>>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn create(&self, agent: &Agent) -> LeadflowResult<Agent>;
    /// Looks up the profile a client's `agent_id` points at.
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Agent>>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn create(&self, lead: &Lead) -> LeadflowResult<Lead>;
    async fn get_by_id(&self, id: Uuid) -> LeadflowResult<Option<Lead>>;
    /// All leads, newest first.
    async fn list(&self) -> LeadflowResult<Vec<Lead>>;
    async fn update_status(
        &self,
        id: Uuid,
        status: &LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> LeadflowResult<Lead>;
}
