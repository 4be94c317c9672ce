//! Optional AI text assistant
//!
//! Summaries and answers come from an OpenAI-compatible chat endpoint when an
//! API key is configured. Without one the disabled assistant answers with fixed
//! messages and never errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub mod openai;

pub use openai::OpenAiAssistant;

pub const SUMMARY_NOT_CONFIGURED: &str = "OpenAI not configured (add OPENAI_API_KEY).";
pub const ANSWER_NOT_CONFIGURED: &str = "(AI disabled) Configure OPENAI_API_KEY.";

/// Forecast metrics handed to the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub temp: f64,
    pub humidity: f64,
    pub wind: f64,
    pub rain: f64,
}

#[async_trait]
pub trait TextAssistant: Send + Sync {
    /// Whether the assistant talks to a real model
    fn is_configured(&self) -> bool;

    /// One concise sentence describing the metrics
    async fn summarize(&self, metrics: &SummaryMetrics) -> Result<String>;

    /// Answer a free-form question using optional context
    async fn answer(&self, question: &str, context: &str) -> Result<String>;
}

/// Stand-in used when no API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAssistant;

#[async_trait]
impl TextAssistant for DisabledAssistant {
    fn is_configured(&self) -> bool {
        false
    }

    async fn summarize(&self, _metrics: &SummaryMetrics) -> Result<String> {
        Ok(SUMMARY_NOT_CONFIGURED.to_string())
    }

    async fn answer(&self, _question: &str, _context: &str) -> Result<String> {
        Ok(ANSWER_NOT_CONFIGURED.to_string())
    }
}
