use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use leadflow_domain::{LeadFilter, LeadSource, LeadStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiResult, response::success, routes::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct PipelineQueryParams {
    pub source: Option<String>,
    pub search: Option<String>,
}

impl From<PipelineQueryParams> for LeadFilter {
    fn from(params: PipelineQueryParams) -> Self {
        LeadFilter {
            source: params
                .source
                .filter(|s| !s.trim().is_empty())
                .map(LeadSource::from),
            search: params.search,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Leads grouped into stage columns for the kanban view.
pub async fn get_pipeline(
    State(state): State<AppState>,
    Query(params): Query<PipelineQueryParams>,
) -> ApiResult<impl IntoResponse> {
    let board = state.pipeline.board(&params.into()).await?;
    Ok(success(board))
}

pub async fn advance_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.pipeline.advance_lead(id).await?;
    Ok(success(outcome))
}

pub async fn set_lead_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let lead = state
        .pipeline
        .set_status(id, LeadStatus::from(request.status.trim()))
        .await?;
    Ok(success(lead))
}
