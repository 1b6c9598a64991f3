//! # Leadflow Domain
//!
//! Entities, store ports and the pure rules of the lead pipeline:
//!
//! - [`template`]: `{{variable}}` rendering for follow-up messages
//! - [`pipeline`]: the lead stage machine, board grouping and filtering
//! - [`repositories`] / [`messaging`]: the ports the dispatcher is written against

pub mod entities;
pub mod messaging;
pub mod pipeline;
pub mod repositories;
pub mod services;
pub mod template;

pub use entities::*;
pub use leadflow_errors::{LeadflowError, LeadflowResult};
pub use messaging::*;
pub use pipeline::{
    advance, next_stage, AdvanceOutcome, LeadFilter, PipelineBoard, StageColumn, PIPELINE_STAGES,
};
pub use repositories::*;
pub use services::{LeadPipelineService, PipelineMetrics};
pub use template::{render, render_str, RenderedMessage};
