pub mod sqlite_contact_repositories;
pub mod sqlite_followup_task_repository;
pub mod sqlite_lead_repository;

pub use sqlite_contact_repositories::{
    SqliteAgentRepository, SqliteClientRepository, SqliteTemplateRepository,
};
pub use sqlite_followup_task_repository::SqliteFollowupTaskRepository;
pub use sqlite_lead_repository::SqliteLeadRepository;
