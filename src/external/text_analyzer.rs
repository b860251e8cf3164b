use async_trait::async_trait;
use thiserror::Error;

use crate::models::TextAnalysis;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("request timed out")]
    Timeout,
}

/// Source of structured sentiment analysis for a piece of text
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<TextAnalysis, AnalyzerError>;
}
