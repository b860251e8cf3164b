use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::text_analyzer::TextAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when no analyzer credentials were configured
    pub analyzer: Option<Arc<dyn TextAnalyzer>>,
}

impl AppState {
    pub fn new(config: AppConfig, analyzer: Option<Arc<dyn TextAnalyzer>>) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }
}
