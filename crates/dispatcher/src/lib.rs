//! # Leadflow Dispatcher
//!
//! The follow-up batch run: finds due follow-ups, resolves client, agent and
//! template, renders the message, sends it and marks the task `sent`.

pub mod followup_dispatcher;
pub mod report;
pub mod settings;
pub mod variables;

pub use followup_dispatcher::FollowupDispatcher;
pub use report::BatchReport;
pub use settings::DispatcherSettings;
