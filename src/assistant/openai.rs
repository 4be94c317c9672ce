//! OpenAI-compatible chat completions client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{SummaryMetrics, TextAssistant};
use crate::config::AiConfig;
use crate::error::{AstrocastError, Provider};
use crate::Result;

const SYSTEM_PROMPT: &str = "You are a concise weather assistant helping people plan outdoor events.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiAssistant {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiAssistant {
    pub fn new(config: &AiConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()
            .map_err(|e| AstrocastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    #[instrument(level = "debug", skip(self, prompt))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AstrocastError::provider(Provider::Assistant, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Chat completion failed with {}: {}", status, body);
            return Err(AstrocastError::provider(
                Provider::Assistant,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            AstrocastError::provider(Provider::Assistant, format!("invalid response: {e}"))
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AstrocastError::provider(Provider::Assistant, "empty completion"))?;

        debug!("Received {} characters from the model", text.len());
        Ok(text)
    }
}

#[async_trait]
impl TextAssistant for OpenAiAssistant {
    fn is_configured(&self) -> bool {
        true
    }

    async fn summarize(&self, metrics: &SummaryMetrics) -> Result<String> {
        let prompt = format!(
            "Summarize these forecast metrics for an outdoor event in one concise sentence: \
             temp {:.1}C, humidity {:.0}%, wind {:.1} m/s, rain {:.1} mm.",
            metrics.temp, metrics.humidity, metrics.wind, metrics.rain
        );
        self.complete(&prompt).await
    }

    async fn answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = if context.is_empty() {
            question.to_string()
        } else {
            format!("Context: {context}\n\nQuestion: {question}")
        };
        self.complete(&prompt).await
    }
}
