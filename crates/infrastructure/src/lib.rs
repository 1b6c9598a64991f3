pub mod database;
pub mod messaging;
pub mod observability;

pub use database::{
    DatabaseManager, SqliteAgentRepository, SqliteClientRepository, SqliteFollowupTaskRepository,
    SqliteLeadRepository, SqliteTemplateRepository,
};
pub use messaging::HttpMessageSender;
pub use observability::{MetricsCollector, StructuredLogger};
