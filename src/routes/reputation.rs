use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ReputationSummary, SentimentRecord};
use crate::services::reputation_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReputationRequest {
    pub records: Vec<SentimentRecord>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(summarize_reputation))
}

/// POST /api/reputation
pub async fn summarize_reputation(
    State(_state): State<AppState>,
    Json(request): Json<ReputationRequest>,
) -> Result<Json<ReputationSummary>, AppError> {
    info!("POST /api/reputation - {} records", request.records.len());

    reputation_service::summarize(&request.records)
        .map(Json)
        .ok_or_else(|| AppError::Validation("records must not be empty".to_string()))
}
