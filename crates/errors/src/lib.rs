use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LeadflowError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database operation failed: {0}")]
    DatabaseOperation(String),
    #[error("lead not found: {id}")]
    LeadNotFound { id: Uuid },
    #[error("followup not found: {id}")]
    FollowupNotFound { id: Uuid },
    #[error("followup {id} is no longer pending")]
    FollowupAlreadyDispatched { id: Uuid },
    #[error("send failed: {0}")]
    Send(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type LeadflowResult<T> = Result<T, LeadflowError>;

impl LeadflowError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn lead_not_found(id: Uuid) -> Self {
        Self::LeadNotFound { id }
    }
    pub fn followup_not_found(id: Uuid) -> Self {
        Self::FollowupNotFound { id }
    }
    pub fn send_error<S: Into<String>>(msg: S) -> Self {
        Self::Send(msg.into())
    }
    pub fn network_error<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LeadflowError::LeadNotFound { .. }
                | LeadflowError::FollowupNotFound { .. }
        )
    }
    /// Errors that the next scheduled run may get past without anyone fixing data.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LeadflowError::Database(_)
                | LeadflowError::DatabaseOperation(_)
                | LeadflowError::Send(_)
                | LeadflowError::Network(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            LeadflowError::LeadNotFound { .. } => "The requested lead does not exist",
            LeadflowError::FollowupNotFound { .. } => "The requested follow-up does not exist",
            LeadflowError::FollowupAlreadyDispatched { .. } => "The follow-up was already sent",
            LeadflowError::Validation(_) => "Input validation failed",
            LeadflowError::Send(_) | LeadflowError::Network(_) => {
                "The message channel is unavailable, please retry later"
            }
            _ => "The service is busy, please retry later",
        }
    }
}

impl From<serde_json::Error> for LeadflowError {
    fn from(err: serde_json::Error) -> Self {
        LeadflowError::Serialization(err.to_string())
    }
}

impl From<uuid::Error> for LeadflowError {
    fn from(err: uuid::Error) -> Self {
        LeadflowError::Serialization(format!("invalid uuid: {err}"))
    }
}

impl From<anyhow::Error> for LeadflowError {
    fn from(err: anyhow::Error) -> Self {
        LeadflowError::Internal(err.to_string())
    }
}
