use axum::{body::Bytes, extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    routes::AppState,
};

/// Body of the external trigger. An empty body means "now".
#[derive(Debug, Default, Deserialize)]
pub struct DispatchRequest {
    pub now: Option<DateTime<Utc>>,
}

impl DispatchRequest {
    fn parse(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("invalid dispatch request: {e}")))
    }
}

/// Runs one follow-up batch. A failure to list due follow-ups surfaces as an
/// error response; per-task failures are inside the report.
pub async fn dispatch_followups(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request = DispatchRequest::parse(&body)?;
    let now = request.now.unwrap_or_else(Utc::now);

    let report = state.dispatcher.run_batch(now).await?;
    info!(
        processed = report.processed_count,
        errors = report.errors.len(),
        "Dispatch triggered over HTTP"
    );

    let message = format!(
        "{} of {} due follow-ups sent",
        report.processed_count, report.due_count
    );
    Ok(ApiResponse::success_with_message(report, message))
}
