use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::config::MAX_FORECAST_PERIODS;
use crate::errors::AppError;
use crate::models::{SentimentRecord, TrendResult};
use crate::services::feature_service::sort_chronologically;
use crate::services::trend_forecasting_service::get_trend_analysis_with;
use crate::state::AppState;

/// Body of a trend forecast request
#[derive(Debug, Deserialize)]
pub struct TrendRequest {
    pub records: Vec<SentimentRecord>,
    /// Forecast horizon in days (default from TREND_NUM_PERIODS)
    #[serde(default)]
    pub num_periods: Option<usize>,
    /// Sort records by timestamp before forecasting
    #[serde(default)]
    pub sort: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(forecast_trend))
}

/// POST /api/trends
///
/// Pipeline failures come back as a 200 with `error` set; only a bad horizon,
/// a timeout or a crashed worker are HTTP errors.
pub async fn forecast_trend(
    State(state): State<AppState>,
    Json(request): Json<TrendRequest>,
) -> Result<Json<TrendResult>, AppError> {
    let num_periods = request
        .num_periods
        .unwrap_or(state.config.forecast.num_periods);

    if num_periods > MAX_FORECAST_PERIODS {
        return Err(AppError::Validation(format!(
            "num_periods must be at most {}, got {}",
            MAX_FORECAST_PERIODS, num_periods
        )));
    }

    let config = state.config.forecast.with_periods(num_periods);
    let mut records = request.records;
    if request.sort {
        sort_chronologically(&mut records);
    }

    info!(
        "POST /api/trends - {} records, {} periods",
        records.len(),
        num_periods
    );

    let timeout = state.config.forecast_timeout;
    let task = tokio::task::spawn_blocking(move || get_trend_analysis_with(&records, &config));

    let result = tokio::time::timeout(timeout, task)
        .await
        .map_err(|_| AppError::Timeout(format!("Trend forecast exceeded {}s", timeout.as_secs())))?
        .map_err(|e| AppError::Internal(format!("Trend forecast task failed: {}", e)))?;

    Ok(Json(result))
}
