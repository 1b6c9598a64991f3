//! # Leadflow API
//!
//! HTTP surface over the follow-up dispatcher and the lead pipeline.
//!
//! ## Endpoints
//!
//! - `GET /health` - liveness
//! - `GET /metrics` - Prometheus exposition (when enabled)
//! - `POST /api/followups/dispatch` - run one batch; optional body `{"now": "<rfc3339>"}`
//! - `GET /api/leads/pipeline?source=&search=` - leads grouped by stage
//! - `POST /api/leads/{id}/advance` - move a lead one stage forward
//! - `POST /api/leads/{id}/status` - set a lead's status, body `{"status": "..."}`
//!
//! Every JSON response uses the [`response::ApiResponse`] envelope; errors
//! carry `success: false` and an `error` object (see [`error::ApiError`]).

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use leadflow_config::models::ApiConfig;
use tower::ServiceBuilder;

pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use routes::{create_routes, AppState};

use middleware::{cors_layer, request_logging, trace_layer};

pub fn create_app(state: AppState, config: &ApiConfig) -> Router {
    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if config.cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
