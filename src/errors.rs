use http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::external::text_analyzer::AnalyzerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (StatusCode::TOO_MANY_REQUESTS, headers, "Rate limited").into_response()
            }
            AppError::External(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            AppError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg).into_response()
            }
            AppError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg).into_response(),
            AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<AnalyzerError> for AppError {
    fn from(value: AnalyzerError) -> Self {
        match value {
            AnalyzerError::RateLimited => AppError::RateLimited,
            other => AppError::External(other.to_string()),
        }
    }
}

/// Failures of the trend forecasting pipeline.
///
/// Every variant is folded into `TrendResult::error` by the orchestrator;
/// the display strings are the messages callers see.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrendError {
    #[error("Insufficient data for trend prediction. Need at least {required} data points.")]
    InsufficientData { required: usize, actual: usize },
    #[error("Error in trend prediction: {0}")]
    InvalidInput(String),
    #[error("Error in trend prediction: {0}")]
    Training(String),
    #[error("Error in trend prediction: {0}")]
    Prediction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = TrendError::InsufficientData { required: 10, actual: 5 };
        assert_eq!(
            err.to_string(),
            "Insufficient data for trend prediction. Need at least 10 data points."
        );
    }

    #[test]
    fn test_training_message_prefix() {
        let err = TrendError::Training("training split is empty".to_string());
        assert_eq!(err.to_string(), "Error in trend prediction: training split is empty");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::External("down".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::ServiceUnavailable("off".into()).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Timeout("slow".into()).into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );

        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
    }
}
