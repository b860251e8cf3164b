use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Names of the model inputs, in the order `FeatureRow::to_vector` emits them
pub const FEATURE_NAMES: [&str; 7] = [
    "hour",
    "day_of_week",
    "day_of_month",
    "month",
    "rolling_avg_sentiment",
    "sentiment_std",
    "polarity",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Engineered features for one point of a sentiment series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureRow {
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub day_of_week: u32, // Monday = 0
    pub day_of_month: u32,
    pub month: u32,
    pub rolling_avg_sentiment: f64,
    pub sentiment_std: Option<f64>, // None with fewer than 2 points in the window
    pub polarity: f64,
}

impl FeatureRow {
    /// Build a row for `timestamp` from the trailing polarity window.
    ///
    /// The last element of `window` is the row's own polarity; the caller
    /// guarantees the window is non-empty.
    pub(crate) fn from_window(timestamp: NaiveDateTime, window: &[f64]) -> Self {
        let polarity = window.last().copied().unwrap_or(0.0);
        let (rolling_avg_sentiment, sentiment_std) = window_stats(window);

        Self {
            timestamp,
            hour: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
            day_of_month: timestamp.day(),
            month: timestamp.month(),
            rolling_avg_sentiment,
            sentiment_std,
            polarity,
        }
    }

    /// Model input vector. A missing standard deviation enters as zero.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.hour as f64,
            self.day_of_week as f64,
            self.day_of_month as f64,
            self.month as f64,
            self.rolling_avg_sentiment,
            self.sentiment_std.unwrap_or(0.0),
            self.polarity,
        ]
    }
}

/// Mean and sample standard deviation (n - 1) of a window
fn window_stats(window: &[f64]) -> (f64, Option<f64>) {
    let n = window.len();
    if n == 0 {
        return (0.0, None);
    }

    let mean = window.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, None);
    }

    let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, Some(variance.sqrt()))
}

/// How the feature rows are divided into training and evaluation sets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SplitStrategy {
    /// Earliest rows train, latest rows evaluate
    Chronological,
    /// Seeded shuffle, kept for parity with the original dashboard
    Random { seed: u64 },
}

/// One forecasted period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionPoint {
    pub timestamp: NaiveDateTime,
    pub predicted_sentiment: f64,
}

/// Fit quality of the model behind a forecast
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelPerformance {
    pub train_score: f64, // R², may be negative
    pub test_score: f64,
    pub confidence: f64, // mean of the two scores
}

impl ModelPerformance {
    pub fn new(train_score: f64, test_score: f64) -> Self {
        Self {
            train_score,
            test_score,
            confidence: (train_score + test_score) / 2.0,
        }
    }
}

/// Outcome of a trend analysis request.
///
/// Exactly one of `error` or the (`predictions`, `model_performance`) pair is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendResult {
    pub error: Option<String>,
    pub predictions: Option<Vec<PredictionPoint>>,
    pub model_performance: Option<ModelPerformance>,
}

impl TrendResult {
    pub fn success(predictions: Vec<PredictionPoint>, model_performance: ModelPerformance) -> Self {
        Self {
            error: None,
            predictions: Some(predictions),
            model_performance: Some(model_performance),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            predictions: None,
            model_performance: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
