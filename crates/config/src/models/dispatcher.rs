use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigResult;

/// Follow-up dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Prefix used when formatting a client's budget range.
    pub currency_symbol: String,
    /// Substituted for `{{property_type}}` when the client has no type.
    pub default_property_label: String,
    /// 0 means every due task is attempted in one run.
    pub max_tasks_per_batch: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            default_property_label: "property".to_string(),
            max_tasks_per_batch: 0,
        }
    }
}

impl ConfigValidator for DispatcherConfig {
    fn validate(&self) -> ConfigResult<()> {
        ValidationUtils::validate_not_empty(
            &self.default_property_label,
            "dispatcher.default_property_label",
        )?;
        Ok(())
    }
}
