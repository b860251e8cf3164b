use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sentiment label attached to a scored record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label implied by a polarity value: strictly above zero is positive,
    /// strictly below is negative, zero is neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            SentimentLabel::Positive
        } else if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// A single scored text record as handed over by the sentiment scorer.
///
/// Only `timestamp` and `polarity` feed the trend forecaster; the remaining
/// fields ride along for the reputation summary and for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentRecord {
    pub timestamp: NaiveDateTime,
    pub polarity: f64, // -1.0 to +1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjectivity: Option<f64>, // 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SentimentRecord {
    pub fn new(timestamp: NaiveDateTime, polarity: f64) -> Self {
        Self {
            timestamp,
            polarity,
            subjectivity: None,
            sentiment: None,
            text: None,
        }
    }

    /// Explicit label if the scorer supplied one, otherwise derived from polarity
    pub fn label(&self) -> SentimentLabel {
        self.sentiment
            .unwrap_or_else(|| SentimentLabel::from_polarity(self.polarity))
    }
}

/// Per-label record counts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Aggregate reputation view over a batch of records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationSummary {
    pub reputation_score: f64, // 0 to 100
    pub record_count: usize,
    pub distribution: SentimentDistribution,
    pub average_polarity: f64,
    pub average_subjectivity: Option<f64>,
}

/// Structured result of an LLM text analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextAnalysis {
    pub sentiment: SentimentLabel,
    pub confidence: f64, // 0.0 to 1.0
    pub emotional_tone: String,
    #[serde(default)]
    pub key_drivers: Vec<String>,
}
