use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, routes::AppState};

/// Prometheus text exposition. 404 when metrics are disabled.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let handle = state.prometheus.as_ref().ok_or(ApiError::NotFound)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}
