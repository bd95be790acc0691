//! Weather chat engine.
//!
//! A small conversational assistant that answers weather questions by
//! letting a Gemini model call into two tools (`getWeather`,
//! `getWeatherForecast`) backed by the weatherstack HTTP API:
//! - Gemini API client with function calling
//! - weatherstack client for current conditions and forecasts
//! - Session management with a single tool round per user turn
//! - Interactive stdin/stdout REPL

pub mod config;
pub mod gemini;
pub mod repl;
pub mod session;
pub mod tools;
pub mod weather;

use async_trait::async_trait;

pub use config::AppConfig;
pub use gemini::{GeminiClient, GeminiConfig};
pub use session::ChatSession;
pub use tools::{weather_tools, ToolRunner, WeatherToolbox};
pub use weather::{WeatherClient, WeatherConfig};

/// A chat model the session can talk to. Implemented by `GeminiClient`;
/// tests substitute a scripted model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ChatError>;
}

/// One turn of conversation history.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: Content::Text(text.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

/// Message payload. Tool traffic is kept structured so the wire encoding
/// can tag it the way the Gemini API expects.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Content {
    Text(String),
    /// A function call the model issued (recorded so the follow-up
    /// request replays it before the matching response).
    FunctionCall {
        name: String,
        args: serde_json::Value,
    },
    /// A tool's output, sent back tagged with the tool's name.
    FunctionResponse {
        name: String,
        response: serde_json::Value,
    },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Parsed model output: free text plus zero or more tool-call requests.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
