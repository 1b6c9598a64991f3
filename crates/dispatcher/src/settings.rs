use leadflow_config::DispatcherConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherSettings {
    pub currency_symbol: String,
    /// Used for `property_type` when a client has no type.
    pub default_property_label: String,
    /// Upper bound on tasks attempted per run; the rest wait for the next run.
    pub max_tasks_per_batch: Option<usize>,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self::from(&DispatcherConfig::default())
    }
}

impl From<&DispatcherConfig> for DispatcherSettings {
    fn from(config: &DispatcherConfig) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            default_property_label: config.default_property_label.clone(),
            max_tasks_per_batch: (config.max_tasks_per_batch > 0)
                .then_some(config.max_tasks_per_batch),
        }
    }
}
