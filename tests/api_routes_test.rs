/// HTTP route tests
///
/// Exercises the axum router in-process with `oneshot`:
/// - health check
/// - trend forecasting (success, pipeline error, bad horizon)
/// - reputation summary
/// - text analysis with stub analyzers and without one
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;

use reputation_trends::app::create_app;
use reputation_trends::config::{AppConfig, ForecastConfig};
use reputation_trends::external::text_analyzer::{AnalyzerError, TextAnalyzer};
use reputation_trends::models::{SentimentLabel, TextAnalysis};
use reputation_trends::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Echoes the text it was given back as the emotional tone
struct StubAnalyzer;

#[async_trait]
impl TextAnalyzer for StubAnalyzer {
    async fn analyze(&self, text: &str) -> Result<TextAnalysis, AnalyzerError> {
        Ok(TextAnalysis {
            sentiment: SentimentLabel::Positive,
            confidence: 0.8,
            emotional_tone: text.to_string(),
            key_drivers: vec!["stub".to_string()],
        })
    }
}

struct RateLimitedAnalyzer;

#[async_trait]
impl TextAnalyzer for RateLimitedAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<TextAnalysis, AnalyzerError> {
        Err(AnalyzerError::RateLimited)
    }
}

struct FailingAnalyzer;

#[async_trait]
impl TextAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<TextAnalysis, AnalyzerError> {
        Err(AnalyzerError::Api("HTTP 500: upstream exploded".to_string()))
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        forecast: ForecastConfig {
            n_trees: 20,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn app_with(analyzer: Option<Arc<dyn TextAnalyzer>>) -> Router {
    create_app(AppState::new(test_config(), analyzer))
}

fn records_json(polarities: &[f64]) -> Value {
    let start = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let records: Vec<Value> = polarities
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            json!({
                "timestamp": (start + Duration::days(i as i64)).format("%Y-%m-%dT%H:%M:%S").to_string(),
                "polarity": p,
            })
        })
        .collect();
    Value::Array(records)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn wave(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.9).cos() * 0.6).collect()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let response = app_with(None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_trends_returns_predictions() {
    let body = json!({ "records": records_json(&wave(14)), "num_periods": 4 });
    let response = app_with(None).oneshot(post_json("/api/trends", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert!(json["error"].is_null());
    assert_eq!(json["predictions"].as_array().unwrap().len(), 4);
    assert_eq!(json["predictions"][0]["timestamp"], "2024-06-15T12:00:00");
    assert!(json["model_performance"]["test_score"].is_number());
}

#[tokio::test]
async fn test_trends_insufficient_data_is_ok_with_error() {
    let body = json!({ "records": records_json(&wave(4)) });
    let response = app_with(None).oneshot(post_json("/api/trends", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(
        json["error"],
        "Insufficient data for trend prediction. Need at least 10 data points."
    );
    assert!(json["predictions"].is_null());
}

#[tokio::test]
async fn test_trends_rejects_long_horizon() {
    let body = json!({ "records": records_json(&wave(12)), "num_periods": 366 });
    let response = app_with(None).oneshot(post_json("/api/trends", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trends_sorts_when_asked() {
    let mut records = records_json(&wave(12));
    records.as_array_mut().unwrap().swap(0, 11);

    let unsorted = json!({ "records": records.clone() });
    let response = app_with(None).oneshot(post_json("/api/trends", unsorted)).await.unwrap();
    let json = read_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Error in trend prediction"));

    let sorted = json!({ "records": records, "sort": true });
    let response = app_with(None).oneshot(post_json("/api/trends", sorted)).await.unwrap();
    let json = read_json(response).await;
    assert!(json["error"].is_null());
    assert_eq!(json["predictions"].as_array().unwrap().len(), 7);
}

// ---------------------------------------------------------------------------
// Reputation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reputation_summary() {
    let body = json!({ "records": records_json(&[-1.0, 0.0, 1.0]) });
    let response = app_with(None).oneshot(post_json("/api/reputation", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    // (0 * 0.5 + 50 * 0.75 + 100 * 1.0) / 3
    assert_eq!(json["reputation_score"], 45.8);
    assert_eq!(json["record_count"], 3);
    assert_eq!(json["distribution"], json!({"positive": 1, "negative": 1, "neutral": 1}));
}

#[tokio::test]
async fn test_reputation_rejects_empty_batch() {
    let body = json!({ "records": [] });
    let response = app_with(None).oneshot(post_json("/api/reputation", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Text analysis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_analysis_uses_processed_text() {
    let body = json!({ "text": "  LOVE the new app!!  " });
    let response = app_with(Some(Arc::new(StubAnalyzer)))
        .oneshot(post_json("/api/analysis/text", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["processed_text"], "love the new app");
    assert_eq!(json["analysis"]["sentiment"], "positive");
    assert_eq!(json["analysis"]["emotional_tone"], "love the new app");
}

#[tokio::test]
async fn test_analysis_without_analyzer_is_unavailable() {
    let body = json!({ "text": "hello" });
    let response = app_with(None).oneshot(post_json("/api/analysis/text", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analysis_upstream_failure_is_bad_gateway() {
    let body = json!({ "text": "hello" });
    let response = app_with(Some(Arc::new(FailingAnalyzer)))
        .oneshot(post_json("/api/analysis/text", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_analysis_rejects_blank_text() {
    let body = json!({ "text": "!!! ..." });
    let response = app_with(Some(Arc::new(StubAnalyzer)))
        .oneshot(post_json("/api/analysis/text", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_rate_limit_is_forwarded() {
    let body = json!({ "text": "hello" });
    let response = app_with(Some(Arc::new(RateLimitedAnalyzer)))
        .oneshot(post_json("/api/analysis/text", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "60");
}
