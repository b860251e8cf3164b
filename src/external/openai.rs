use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::external::text_analyzer::{AnalyzerError, TextAnalyzer};
use crate::models::{SentimentLabel, TextAnalysis};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a sentiment analysis expert. Analyze the sentiment of the text \
and provide: overall sentiment (positive/negative/neutral), confidence score (0-1), emotional tone, \
and key sentiment drivers. Respond with JSON in this format: \
{\"sentiment\": string, \"confidence\": float, \"emotional_tone\": string, \"key_drivers\": [string]}";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// The JSON object the model is asked to produce
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    sentiment: String,
    confidence: f64,
    emotional_tone: String,
    #[serde(default)]
    key_drivers: Vec<String>,
}

/// OpenAI chat-completions backed analyzer
pub struct OpenAiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiAnalyzer {
    pub fn new(api_key: String, model: String) -> Result<Self, AnalyzerError> {
        if api_key.trim().is_empty() {
            return Err(AnalyzerError::MissingCredential(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AnalyzerError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn from_env(model: &str) -> Result<Self, AnalyzerError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AnalyzerError::MissingCredential("OPENAI_API_KEY not set".into()))?;

        Self::new(api_key, model.to_string())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, text: &str) -> Result<String, AnalyzerError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout
                } else {
                    AnalyzerError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(AnalyzerError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AnalyzerError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalyzerError::Parse("No content in response".to_string()))
    }
}

#[async_trait]
impl TextAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<TextAnalysis, AnalyzerError> {
        info!("[ANALYZER] Analyzing {} chars with {}", text.len(), self.model);

        let content = self.complete(text).await.inspect_err(|e| {
            warn!("❌ [ANALYZER] OpenAI request failed: {}", e);
        })?;

        parse_analysis(&content)
    }
}

/// Decode the model's JSON answer into a `TextAnalysis`
fn parse_analysis(content: &str) -> Result<TextAnalysis, AnalyzerError> {
    let raw: RawAnalysis = serde_json::from_str(content)
        .map_err(|e| AnalyzerError::Parse(format!("invalid analysis JSON: {}", e)))?;

    let sentiment = match raw.sentiment.trim().to_lowercase().as_str() {
        "positive" => SentimentLabel::Positive,
        "negative" => SentimentLabel::Negative,
        "neutral" => SentimentLabel::Neutral,
        other => {
            return Err(AnalyzerError::Parse(format!(
                "unknown sentiment label: {}",
                other
            )))
        }
    };

    if !raw.confidence.is_finite() {
        return Err(AnalyzerError::Parse("confidence is not a number".to_string()));
    }

    Ok(TextAnalysis {
        sentiment,
        confidence: raw.confidence.clamp(0.0, 1.0),
        emotional_tone: raw.emotional_tone,
        key_drivers: raw.key_drivers,
    })
}
