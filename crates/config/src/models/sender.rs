use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

/// Outbound message channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:54321/functions/v1/send-email".to_string(),
            api_key: None,
            timeout_seconds: 10,
        }
    }
}

impl ConfigValidator for SenderConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_url(&self.endpoint, &["http", "https"], "sender.endpoint")?;
        ValidationUtils::validate_timeout_seconds(self.timeout_seconds, "sender.timeout_seconds")?;
        if let Some(key) = &self.api_key {
            ValidationUtils::validate_not_empty(key, "sender.api_key")?;
        }
        Ok(())
    }
}
