//! Counters and histograms for follow-up dispatch and the lead pipeline.
//!
//! Handles are registered against whatever global recorder is installed. With
//! no recorder (unit tests, `dispatch` runs without metrics) every call is a
//! no-op.

use anyhow::Result;
use leadflow_domain::services::PipelineMetrics;
use metrics::{counter, histogram, Counter, Histogram};
use tracing::debug;

pub struct MetricsCollector {
    followups_sent_total: Counter,
    followup_failures_total: Counter,
    followup_batches_total: Counter,
    followup_batch_duration: Histogram,
    leads_advanced_total: Counter,
}

impl MetricsCollector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            followups_sent_total: counter!("leadflow_followups_sent_total"),
            followup_failures_total: counter!("leadflow_followup_failures_total"),
            followup_batches_total: counter!("leadflow_followup_batches_total"),
            followup_batch_duration: histogram!("leadflow_followup_batch_duration_seconds"),
            leads_advanced_total: counter!("leadflow_leads_advanced_total"),
        })
    }

    pub fn record_followup_sent(&self) {
        self.followups_sent_total.increment(1);
    }

    pub fn record_followup_failure(&self, error_type: &str) {
        self.followup_failures_total.increment(1);
        debug!(error_type = error_type, "Follow-up failure recorded");
    }

    pub fn record_batch(&self, duration_seconds: f64) {
        self.followup_batches_total.increment(1);
        self.followup_batch_duration.record(duration_seconds);
    }

    pub fn record_lead_advanced(&self) {
        self.leads_advanced_total.increment(1);
    }
}

impl PipelineMetrics for MetricsCollector {
    fn record_lead_advanced(&self) {
        MetricsCollector::record_lead_advanced(self);
    }
}
