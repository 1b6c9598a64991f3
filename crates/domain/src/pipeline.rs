//! Lead stage machine and the pipeline (kanban) view over leads.

use serde::{Deserialize, Serialize};

use crate::entities::{Lead, LeadSource, LeadStatus};

/// Order used by the "advance" action. `Converted` is deliberately absent:
/// it is reached only by an explicit status assignment.
pub const PIPELINE_STAGES: [LeadStatus; 5] = [
    LeadStatus::New,
    LeadStatus::Contacted,
    LeadStatus::Qualified,
    LeadStatus::Negotiation,
    LeadStatus::Closed,
];

/// The stage after `current`, or `None` at the end of the order or for a
/// status that is not part of it.
pub fn next_stage(current: &LeadStatus) -> Option<LeadStatus> {
    let position = PIPELINE_STAGES.iter().position(|stage| stage == current)?;
    PIPELINE_STAGES.get(position + 1).cloned()
}

impl LeadStatus {
    pub fn next_stage(&self) -> Option<LeadStatus> {
        next_stage(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    Advanced { from: LeadStatus, to: LeadStatus },
    NoFurtherStage { current: LeadStatus },
}

impl AdvanceOutcome {
    pub fn is_advanced(&self) -> bool {
        matches!(self, AdvanceOutcome::Advanced { .. })
    }
}

/// Moves `lead` one step along [`PIPELINE_STAGES`]. Only touches the lead
/// when a next stage exists; persisting is the caller's job.
pub fn advance(lead: &mut Lead) -> AdvanceOutcome {
    match next_stage(&lead.status) {
        Some(to) => {
            let from = std::mem::replace(&mut lead.status, to.clone());
            AdvanceOutcome::Advanced { from, to }
        }
        None => AdvanceOutcome::NoFurtherStage {
            current: lead.status.clone(),
        },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadFilter {
    pub source: Option<LeadSource>,
    /// Case-insensitive substring over name, email and phone.
    pub search: Option<String>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(source) = &self.source {
            if &lead.source != source {
                return false;
            }
        }

        let needle = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => needle.to_lowercase(),
            _ => return true,
        };

        [
            Some(lead.full_name.as_str()),
            lead.email.as_deref(),
            lead.phone.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        leads.iter().filter(|lead| self.matches(lead)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageColumn {
    pub status: LeadStatus,
    pub leads: Vec<Lead>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineBoard {
    pub columns: Vec<StageColumn>,
}

impl PipelineBoard {
    /// Groups leads by status, keeping input order inside each column.
    ///
    /// Columns for the canonical stages and `converted` are always present;
    /// any other status gets its own column after them, in first-seen order.
    pub fn group<I>(leads: I) -> Self
    where
        I: IntoIterator<Item = Lead>,
    {
        let mut columns: Vec<StageColumn> = PIPELINE_STAGES
            .iter()
            .cloned()
            .chain(std::iter::once(LeadStatus::Converted))
            .map(|status| StageColumn {
                status,
                leads: Vec::new(),
            })
            .collect();

        for lead in leads {
            match columns.iter_mut().find(|c| c.status == lead.status) {
                Some(column) => column.leads.push(lead),
                None => columns.push(StageColumn {
                    status: lead.status.clone(),
                    leads: vec![lead],
                }),
            }
        }

        Self { columns }
    }

    pub fn group_filtered(leads: &[Lead], filter: &LeadFilter) -> Self {
        Self::group(filter.apply(leads).into_iter().cloned())
    }

    pub fn column(&self, status: &LeadStatus) -> Option<&StageColumn> {
        self.columns.iter().find(|c| &c.status == status)
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.leads.len()).sum()
    }
}
