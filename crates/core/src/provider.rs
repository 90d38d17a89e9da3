//! Provider trait — the Model Gateway abstraction.
//!
//! A Provider sends one complete prompt (plus optional tool declarations) to
//! a hosted model and returns either generated text or a requested function
//! call. Providers are stateless: callers supply the full context on every
//! request.
//!
//! Implementations: OpenAI-compatible chat completions, Google Gemini.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::{Message, MessageToolCall};

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-2.5-flash", "gpt-4o-mini")
    pub model: String,

    /// The prompt messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Function declarations the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

fn default_temperature() -> f32 {
    0.7
}

impl ProviderRequest {
    /// Build a request with no tool declarations.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
            tools: Vec::new(),
        }
    }
}

/// A tool declaration sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

impl ProviderResponse {
    /// The first function call the model requested, if any.
    pub fn function_call(&self) -> Option<&MessageToolCall> {
        self.message.tool_calls.first()
    }

    /// The generated text, trimmed; `None` when the model produced none.
    pub fn text(&self) -> Option<&str> {
        let text = self.message.content.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Every model backend implements this trait. Agents call `complete()`
/// without knowing which backend is behind it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(message: Message) -> ProviderResponse {
        ProviderResponse {
            message,
            usage: None,
            model: "mock".into(),
        }
    }

    #[test]
    fn provider_request_defaults() {
        let req = ProviderRequest::new("gemini-2.5-flash", vec![]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.tools.is_empty());
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "analyze_weather_and_seasons".into(),
            description: "Analyze seasonal weather".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                },
                "required": ["location"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("analyze_weather_and_seasons"));
        assert!(json.contains("location"));
    }

    #[test]
    fn blank_text_is_none() {
        let resp = response_with(Message::assistant("   \n"));
        assert!(resp.text().is_none());
        assert!(resp.function_call().is_none());
    }

    #[test]
    fn function_call_returns_first() {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![
            MessageToolCall { id: "a".into(), name: "first".into(), arguments: "{}".into() },
            MessageToolCall { id: "b".into(), name: "second".into(), arguments: "{}".into() },
        ];
        let resp = response_with(msg);
        assert_eq!(resp.function_call().unwrap().name, "first");
    }
}
