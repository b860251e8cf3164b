use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::TextAnalysis;
use crate::services::text_service::preprocess_text;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextAnalysisRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TextAnalysisResponse {
    pub processed_text: String,
    pub analysis: TextAnalysis,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/text", post(analyze_text))
}

/// POST /api/analysis/text
pub async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<TextAnalysisRequest>,
) -> Result<Json<TextAnalysisResponse>, AppError> {
    let analyzer = state.analyzer.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable(
            "Text analyzer is not configured. Set OPENAI_API_KEY to enable text analysis.".to_string(),
        )
    })?;

    let processed_text = preprocess_text(&request.text);
    if processed_text.is_empty() {
        return Err(AppError::Validation(
            "text has no analyzable content".to_string(),
        ));
    }

    info!("POST /api/analysis/text - {} chars", processed_text.len());

    let analysis = analyzer.analyze(&processed_text).await?;

    Ok(Json(TextAnalysisResponse {
        processed_text,
        analysis,
    }))
}
