use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::net::TcpListener;

use reputation_trends::app::create_app;
use reputation_trends::config::AppConfig;
use reputation_trends::external::openai::OpenAiAnalyzer;
use reputation_trends::external::text_analyzer::{AnalyzerError, TextAnalyzer};
use reputation_trends::logging::{init_logging, LoggingConfig};
use reputation_trends::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let analyzer: Option<Arc<dyn TextAnalyzer>> = match OpenAiAnalyzer::from_env(&config.openai_model) {
        Ok(analyzer) => {
            tracing::info!("🤖 Text analysis enabled (model: {})", analyzer.model());
            Some(Arc::new(analyzer))
        }
        Err(AnalyzerError::MissingCredential(reason)) => {
            tracing::warn!("⚠️ Text analysis disabled: {}", reason);
            None
        }
        Err(e) => return Err(anyhow!("Failed to create OpenAI analyzer: {}", e)),
    };

    let addr = config.bind_addr;
    let app = create_app(AppState::new(config, analyzer));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Reputation trends service running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
