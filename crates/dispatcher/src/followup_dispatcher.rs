//! One batch run over the due follow-ups.
//!
//! Tasks are handled strictly one after another. A task that fails at any
//! step, including a stored row that cannot be decoded, is recorded in the
//! [`BatchReport`] and left `pending`, so the next scheduled run picks it up
//! again; only a failure of the due query itself aborts the batch.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use leadflow_domain::entities::{Agent, Client, EmailTemplate, FollowupTask};
use leadflow_domain::messaging::{MessageSender, OutboundMessage, SendMetadata};
use leadflow_domain::repositories::{
    AgentRepository, ClientRepository, DueFollowup, FollowupTaskRepository, TemplateRepository,
};
use leadflow_domain::template::{self, missing_variables};
use leadflow_errors::{LeadflowError, LeadflowResult};
use leadflow_infrastructure::{MetricsCollector, StructuredLogger};
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::report::BatchReport;
use crate::settings::DispatcherSettings;
use crate::variables::build_variables;

/// Why a single task did not reach `sent`. The display text is what lands
/// in [`BatchReport::errors`].
#[derive(Debug, thiserror::Error)]
enum FollowupFailure {
    #[error("failed to load followup {id}: {reason}")]
    Unreadable { id: String, reason: String },
    #[error("missing client or template for followup {id}")]
    Unresolved { id: Uuid },
    #[error("agent not found for followup {id}")]
    AgentMissing { id: Uuid },
    #[error("failed to resolve followup {id}: {reason}")]
    Lookup { id: Uuid, reason: String },
    #[error("send failed for followup {id}: {reason}")]
    Send { id: Uuid, reason: String },
    #[error("failed to mark followup {id} as sent: {reason}")]
    MarkSent { id: Uuid, reason: String },
}

impl FollowupFailure {
    fn kind(&self) -> &'static str {
        match self {
            FollowupFailure::Unreadable { .. } => "unreadable",
            FollowupFailure::Unresolved { .. } => "unresolved",
            FollowupFailure::AgentMissing { .. } => "agent_missing",
            FollowupFailure::Lookup { .. } => "lookup",
            FollowupFailure::Send { .. } => "send",
            FollowupFailure::MarkSent { .. } => "mark_sent",
        }
    }
}

struct ResolvedFollowup {
    client: Client,
    template: EmailTemplate,
    agent: Agent,
}

pub struct FollowupDispatcher {
    task_repo: Arc<dyn FollowupTaskRepository>,
    client_repo: Arc<dyn ClientRepository>,
    template_repo: Arc<dyn TemplateRepository>,
    agent_repo: Arc<dyn AgentRepository>,
    sender: Arc<dyn MessageSender>,
    metrics: Arc<MetricsCollector>,
    settings: DispatcherSettings,
}

impl FollowupDispatcher {
    pub fn new(
        task_repo: Arc<dyn FollowupTaskRepository>,
        client_repo: Arc<dyn ClientRepository>,
        template_repo: Arc<dyn TemplateRepository>,
        agent_repo: Arc<dyn AgentRepository>,
        sender: Arc<dyn MessageSender>,
        metrics: Arc<MetricsCollector>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            task_repo,
            client_repo,
            template_repo,
            agent_repo,
            sender,
            metrics,
            settings,
        }
    }

    /// Dispatches every follow-up due at `now`.
    ///
    /// Returns `Err` only when the due tasks cannot be listed; in that case
    /// nothing was attempted.
    pub async fn run_batch(&self, now: DateTime<Utc>) -> LeadflowResult<BatchReport> {
        let span = info_span!("run_batch", batch.now = %now);
        self.run_batch_inner(now).instrument(span).await
    }

    async fn run_batch_inner(&self, now: DateTime<Utc>) -> LeadflowResult<BatchReport> {
        let start_time = Instant::now();

        let mut due = match self.task_repo.list_due(now).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "Failed to list due follow-ups, batch aborted");
                return Err(e);
            }
        };

        let mut report = BatchReport {
            due_count: due.len(),
            ..BatchReport::default()
        };
        StructuredLogger::log_batch_started(now, report.due_count);

        if due.is_empty() {
            debug!("No follow-ups due");
            return Ok(report);
        }

        if let Some(cap) = self.settings.max_tasks_per_batch {
            if due.len() > cap {
                debug!(
                    "Batch capped at {} of {} due follow-ups",
                    cap, report.due_count
                );
                due.truncate(cap);
            }
        }

        for entry in due {
            let outcome = match entry {
                DueFollowup::Ready(task) => {
                    let task_span = info_span!(
                        "followup",
                        followup.id = %task.id,
                        followup.trigger_type = %task.trigger_type
                    );
                    self.dispatch_one(&task, now).instrument(task_span).await
                }
                // Left untouched in the store; it stays pending.
                DueFollowup::Unreadable { id, reason } => {
                    warn!(followup.id = %id, error = %reason, "Skipping unreadable follow-up");
                    Err(FollowupFailure::Unreadable { id, reason })
                }
            };

            match outcome {
                Ok(()) => {
                    report.processed_count += 1;
                    self.metrics.record_followup_sent();
                }
                Err(failure) => {
                    self.metrics.record_followup_failure(failure.kind());
                    report.errors.push(failure.to_string());
                }
            }
        }

        let elapsed = start_time.elapsed();
        self.metrics.record_batch(elapsed.as_secs_f64());
        StructuredLogger::log_batch_completed(
            report.due_count,
            report.processed_count,
            report.errors.len(),
            elapsed.as_millis() as u64,
        );

        Ok(report)
    }

    async fn dispatch_one(
        &self,
        task: &FollowupTask,
        now: DateTime<Utc>,
    ) -> Result<(), FollowupFailure> {
        let resolved = match self.resolve(task).await {
            Ok(resolved) => resolved,
            Err(failure) => {
                StructuredLogger::log_followup_skipped(task.id, &failure.to_string());
                return Err(failure);
            }
        };

        let variables = build_variables(&resolved.client, &resolved.agent, &self.settings);
        let missing = missing_variables(&resolved.template, &variables);
        if !missing.is_empty() {
            debug!(
                template.id = %resolved.template.id,
                "Template placeholders without a value: {}",
                missing.join(", ")
            );
        }
        let rendered = template::render(&resolved.template, &variables);

        let message = OutboundMessage {
            client_id: resolved.client.id,
            subject: rendered.subject,
            body: rendered.body,
            metadata: SendMetadata {
                followup_id: task.id,
                trigger_type: task.trigger_type.clone(),
            },
        };

        let reason = match self.sender.send(&message).await {
            Ok(ack) if ack.delivered => None,
            Ok(ack) => Some(
                ack.error
                    .unwrap_or_else(|| "channel did not accept the message".to_string()),
            ),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = reason {
            StructuredLogger::log_followup_send_failed(task.id, resolved.client.id, &reason);
            return Err(FollowupFailure::Send {
                id: task.id,
                reason,
            });
        }

        // The message is out at this point; a failed write means the next run
        // will send it again.
        if let Err(e) = self.task_repo.mark_sent(task.id, now).await {
            match &e {
                LeadflowError::FollowupAlreadyDispatched { .. } => {
                    warn!("Follow-up was marked sent by another run")
                }
                _ => error!(error = %e, "Follow-up sent but status write failed"),
            }
            return Err(FollowupFailure::MarkSent {
                id: task.id,
                reason: e.to_string(),
            });
        }

        StructuredLogger::log_followup_sent(
            task.id,
            resolved.client.id,
            task.trigger_type.as_str(),
        );
        Ok(())
    }

    async fn resolve(&self, task: &FollowupTask) -> Result<ResolvedFollowup, FollowupFailure> {
        let id = task.id;
        let lookup = |e: LeadflowError| FollowupFailure::Lookup {
            id,
            reason: e.to_string(),
        };

        let (Some(client_id), Some(template_id)) = (task.client_id, task.template_id) else {
            return Err(FollowupFailure::Unresolved { id });
        };

        let client = self.client_repo.get_by_id(client_id).await.map_err(lookup)?;
        let template = self
            .template_repo
            .get_by_id(template_id)
            .await
            .map_err(lookup)?;
        let (Some(client), Some(template)) = (client, template) else {
            return Err(FollowupFailure::Unresolved { id });
        };

        let agent = match client.agent_id {
            Some(agent_id) => self.agent_repo.get_by_id(agent_id).await.map_err(lookup)?,
            None => None,
        };
        let agent = agent.ok_or(FollowupFailure::AgentMissing { id })?;

        Ok(ResolvedFollowup {
            client,
            template,
            agent,
        })
    }
}
