use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leadflow_errors::LeadflowError;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Leadflow(#[from] LeadflowError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found")]
    NotFound,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Leadflow(e) if e.is_not_found() => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            ApiError::Leadflow(e @ LeadflowError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            ApiError::Leadflow(e @ LeadflowError::FollowupAlreadyDispatched { .. }) => {
                (StatusCode::CONFLICT, "CONFLICT", e.to_string())
            }
            ApiError::Leadflow(e) if e.is_retryable() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                e.user_message().to_string(),
            ),
            ApiError::Leadflow(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.user_message().to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "resource not found".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.parts();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "data": null,
            "message": message,
            "error": {
                "type": error_type,
                "code": status.as_u16(),
            },
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
