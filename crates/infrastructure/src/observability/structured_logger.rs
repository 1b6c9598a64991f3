//! Event-tagged log records for the follow-up dispatcher.
//!
//! Every record carries an `event` field so log pipelines can filter on it
//! without parsing the message text.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_batch_started(now: DateTime<Utc>, due_count: usize) {
        info!(
            event = "followup_batch_started",
            batch.now = %now,
            batch.due_count = due_count,
            "Follow-up batch started"
        );
    }

    pub fn log_followup_sent(followup_id: Uuid, client_id: Uuid, trigger_type: &str) {
        info!(
            event = "followup_sent",
            followup.id = %followup_id,
            client.id = %client_id,
            followup.trigger_type = trigger_type,
            "Follow-up sent"
        );
    }

    /// The task could not be resolved far enough to attempt a send.
    pub fn log_followup_skipped(followup_id: Uuid, reason: &str) {
        warn!(
            event = "followup_skipped",
            followup.id = %followup_id,
            followup.reason = reason,
            "Follow-up skipped"
        );
    }

    pub fn log_followup_send_failed(followup_id: Uuid, client_id: Uuid, reason: &str) {
        warn!(
            event = "followup_send_failed",
            followup.id = %followup_id,
            client.id = %client_id,
            followup.error = reason,
            "Follow-up send failed"
        );
    }

    pub fn log_batch_completed(
        due_count: usize,
        processed_count: usize,
        error_count: usize,
        duration_ms: u64,
    ) {
        if error_count == 0 {
            info!(
                event = "followup_batch_completed",
                batch.due_count = due_count,
                batch.processed_count = processed_count,
                batch.error_count = error_count,
                batch.duration_ms = duration_ms,
                "Follow-up batch completed"
            );
        } else {
            warn!(
                event = "followup_batch_completed",
                batch.due_count = due_count,
                batch.processed_count = processed_count,
                batch.error_count = error_count,
                batch.duration_ms = duration_ms,
                "Follow-up batch completed with errors"
            );
        }
    }
}
