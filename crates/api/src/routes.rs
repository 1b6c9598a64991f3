use axum::{
    routing::{get, post},
    Router,
};
use leadflow_dispatcher::FollowupDispatcher;
use leadflow_domain::LeadPipelineService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::handlers::{
    followups::dispatch_followups,
    health::health_check,
    leads::{advance_lead, get_pipeline, set_lead_status},
    metrics::prometheus_metrics,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<FollowupDispatcher>,
    pub pipeline: Arc<LeadPipelineService>,
    /// `None` when metrics export is disabled.
    pub prometheus: Option<PrometheusHandle>,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(prometheus_metrics))
        // follow-up dispatch trigger
        .route("/api/followups/dispatch", post(dispatch_followups))
        // lead pipeline
        .route("/api/leads/pipeline", get(get_pipeline))
        .route("/api/leads/{id}/advance", post(advance_lead))
        .route("/api/leads/{id}/status", post(set_lead_status))
        .with_state(state)
}
