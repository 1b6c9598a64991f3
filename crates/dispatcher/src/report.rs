use serde::{Deserialize, Serialize};

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Tasks that reached `sent` in this run.
    pub processed_count: usize,
    /// One entry per failed task, in processing order.
    pub errors: Vec<String>,
    /// Tasks the due query returned, including any left for a later run by the batch cap.
    pub due_count: usize,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
