use chrono::{Duration, NaiveDateTime};
use tracing::{info, warn};

use crate::config::ForecastConfig;
use crate::errors::TrendError;
use crate::models::{FeatureRow, ModelPerformance, PredictionPoint, SentimentRecord, TrendResult};
use crate::services::feature_service::{build_feature_rows, next_feature_row};
use crate::services::trend_model_service::{train_prediction_model, TrainedModel};

/// One iteration of the forecast recurrence: the synthetic row fed to the
/// model and what the model answered.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub input: FeatureRow,
    pub predicted_sentiment: f64,
}

/// Full trend analysis with the default configuration
pub fn get_trend_analysis(records: &[SentimentRecord]) -> TrendResult {
    get_trend_analysis_with(records, &ForecastConfig::default())
}

/// Full trend analysis: train, evaluate, forecast.
///
/// Never fails; every problem is reported through `TrendResult::error`.
pub fn get_trend_analysis_with(records: &[SentimentRecord], config: &ForecastConfig) -> TrendResult {
    match analyze_trend(records, config) {
        Ok(result) => result,
        Err(err) => {
            warn!("⚠️ [TREND] {} ({} records)", err, records.len());
            TrendResult::failure(err.to_string())
        }
    }
}

/// Fallible core of `get_trend_analysis_with`
pub fn analyze_trend(records: &[SentimentRecord], config: &ForecastConfig) -> Result<TrendResult, TrendError> {
    if records.len() < config.min_data_points {
        return Err(TrendError::InsufficientData {
            required: config.min_data_points,
            actual: records.len(),
        });
    }
    config.validate().map_err(TrendError::InvalidInput)?;

    info!(
        "🔍 [TREND] Forecasting {} periods from {} records",
        config.num_periods,
        records.len()
    );

    let outcome = train_prediction_model(records, config)?;
    let predictions = predict_future_sentiment(records, &outcome.model, config.num_periods)?;
    let performance = ModelPerformance::new(outcome.train_score, outcome.test_score);

    info!(
        "✅ [TREND] {} predictions, confidence {:.3}",
        predictions.len(),
        performance.confidence
    );

    Ok(TrendResult::success(predictions, performance))
}

/// Predict `num_periods` daily values following the last record
pub fn predict_future_sentiment(
    records: &[SentimentRecord],
    model: &TrainedModel,
    num_periods: usize,
) -> Result<Vec<PredictionPoint>, TrendError> {
    Ok(forecast_steps(records, model, num_periods)?
        .into_iter()
        .map(|step| PredictionPoint {
            timestamp: step.input.timestamp,
            predicted_sentiment: step.predicted_sentiment,
        })
        .collect())
}

/// Run the forecast recurrence and keep every intermediate input row.
///
/// Step `i` is stamped `last + (i + 1)` days, counted from the last observed
/// record rather than the growing working series. Each prediction is appended
/// to the working series, so later rolling windows include it.
pub fn forecast_steps(
    records: &[SentimentRecord],
    model: &TrainedModel,
    num_periods: usize,
) -> Result<Vec<ForecastStep>, TrendError> {
    let last_timestamp = records
        .last()
        .map(|r| r.timestamp)
        .ok_or_else(|| TrendError::Prediction("cannot forecast from an empty series".to_string()))?;

    let mut working = build_feature_rows(records)?;
    let mut steps = Vec::with_capacity(num_periods);

    for i in 0..num_periods {
        let timestamp = future_timestamp(last_timestamp, i)?;
        let (next_working, step) = advance(working, model, timestamp)?;
        working = next_working;
        steps.push(step);
    }

    Ok(steps)
}

/// One step of the recurrence. Takes the working series by value and hands
/// it back with the new prediction appended.
fn advance(
    mut working: Vec<FeatureRow>,
    model: &TrainedModel,
    timestamp: NaiveDateTime,
) -> Result<(Vec<FeatureRow>, ForecastStep), TrendError> {
    let input = next_feature_row(&working, timestamp)
        .ok_or_else(|| TrendError::Prediction("working series is empty".to_string()))?;
    let predicted_sentiment = model.predict_row(&input)?;

    working.push(FeatureRow {
        polarity: predicted_sentiment,
        ..input.clone()
    });

    Ok((
        working,
        ForecastStep {
            input,
            predicted_sentiment,
        },
    ))
}

fn future_timestamp(last: NaiveDateTime, step: usize) -> Result<NaiveDateTime, TrendError> {
    last.checked_add_signed(Duration::days(step as i64 + 1))
        .ok_or_else(|| TrendError::Prediction(format!("timestamp overflow {} days after {}", step + 1, last)))
}
