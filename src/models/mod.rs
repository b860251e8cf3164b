mod forecast;
mod sentiment;

pub use forecast::{
    FeatureRow, ModelPerformance, PredictionPoint, SplitStrategy, TrendResult, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use sentiment::{
    ReputationSummary, SentimentDistribution, SentimentLabel, SentimentRecord, TextAnalysis,
};
