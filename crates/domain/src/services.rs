//! Lead pipeline use cases on top of [`LeadRepository`].

use chrono::Utc;
use leadflow_errors::{LeadflowError, LeadflowResult};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{Lead, LeadStatus};
use crate::pipeline::{advance, AdvanceOutcome, LeadFilter, PipelineBoard};
use crate::repositories::LeadRepository;

/// Counters the pipeline reports to. Implemented by the metrics collector.
pub trait PipelineMetrics: Send + Sync {
    fn record_lead_advanced(&self);
}

pub struct LeadPipelineService {
    lead_repo: Arc<dyn LeadRepository>,
    metrics: Arc<dyn PipelineMetrics>,
}

impl LeadPipelineService {
    pub fn new(lead_repo: Arc<dyn LeadRepository>, metrics: Arc<dyn PipelineMetrics>) -> Self {
        Self { lead_repo, metrics }
    }

    async fn load(&self, id: Uuid) -> LeadflowResult<Lead> {
        self.lead_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| LeadflowError::lead_not_found(id))
    }

    /// The "advance" action: one step along the canonical order. A lead at
    /// the end (or outside the order) is left untouched and nothing is written.
    pub async fn advance_lead(&self, id: Uuid) -> LeadflowResult<AdvanceOutcome> {
        let mut lead = self.load(id).await?;
        let outcome = advance(&mut lead);

        match &outcome {
            AdvanceOutcome::Advanced { from, to } => {
                self.lead_repo.update_status(id, to, Utc::now()).await?;
                self.metrics.record_lead_advanced();
                info!(
                    event = "lead_advanced",
                    lead.id = %id,
                    lead.from = %from,
                    lead.to = %to,
                    "Lead advanced to next stage"
                );
            }
            AdvanceOutcome::NoFurtherStage { current } => {
                debug!(lead.id = %id, lead.status = %current, "Lead has no further stage");
            }
        }

        Ok(outcome)
    }

    /// Manual status assignment; any known status may be set, including
    /// `converted`. Unknown strings are refused so the board never grows
    /// columns from typos.
    pub async fn set_status(&self, id: Uuid, status: LeadStatus) -> LeadflowResult<Lead> {
        if !status.is_known() {
            return Err(LeadflowError::validation_error(format!(
                "unknown lead status: {status}"
            )));
        }
        self.load(id).await?;
        let lead = self.lead_repo.update_status(id, &status, Utc::now()).await?;
        info!(lead.id = %id, lead.status = %status, "Lead status set manually");
        Ok(lead)
    }

    pub async fn board(&self, filter: &LeadFilter) -> LeadflowResult<PipelineBoard> {
        let leads = self.lead_repo.list().await?;
        Ok(PipelineBoard::group_filtered(&leads, filter))
    }
}
