use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://leadflow.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

impl ConfigValidator for DatabaseConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database.url cannot be empty".to_string(),
            ));
        }

        if !self.url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(
                "database.url must be a sqlite URL".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::Validation(
                "database.min_connections cannot exceed database.max_connections".to_string(),
            ));
        }

        if self.connection_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "database.connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
