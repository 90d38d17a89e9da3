//! OpenAI-compatible chat completions gateway.
//!
//! Any endpoint exposing `/chat/completions` with function calling works:
//! OpenAI, OpenRouter, Ollama, vLLM, Groq, DeepSeek, Together.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wayfarer_core::error::ProviderError;
use wayfarer_core::message::{Message, MessageToolCall, Role};
use wayfarer_core::provider::*;
use crate::http::{build_client, check_status, transport_error};

/// Base URL for a provider name the gateway knows by heart.
pub fn known_base_url(provider_name: &str) -> Option<&'static str> {
    match provider_name {
        "openai" => Some("https://api.openai.com/v1"),
        "openrouter" => Some("https://openrouter.ai/api/v1"),
        "ollama" => Some("http://localhost:11434/v1"),
        "deepseek" => Some("https://api.deepseek.com/v1"),
        "groq" => Some("https://api.groq.com/openai/v1"),
        "together" => Some("https://api.together.xyz/v1"),
        "vllm" => Some("http://localhost:8000/v1"),
        _ => None,
    }
}

pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: build_client(),
        }
    }

    /// A provider from [`known_base_url`], or `None` for an unknown name.
    pub fn known(name: &str, api_key: impl Into<String>) -> Option<Self> {
        known_base_url(name).map(|url| Self::new(name, url, api_key))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn build_body(request: &ProviderRequest) -> ChatRequest<'_> {
        ChatRequest {
            model: &request.model,
            messages: request.messages.iter().map(ChatMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: request.tools.iter().map(ChatTool::from).collect(),
            stream: false,
        }
    }

    fn parse_response(response: ChatResponse) -> Result<ProviderResponse, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".into()))?;

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| MessageToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ProviderResponse {
            message,
            usage: response.usage,
            model: response.model,
        })
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError> {
        let body = Self::build_body(&request);
        debug!(provider = %self.name, model = %request.model, tools = body.tools.len(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(&self.name, response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;
        Self::parse_response(parsed)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;
        Ok(response.status().is_success())
    }
}

// --- wire types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&Message> for ChatMessage {
    fn from(m: &Message) -> Self {
        let role = match m.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        };
        Self {
            role: role.to_string(),
            content: Some(m.content.clone()),
            tool_calls: (!m.tool_calls.is_empty()).then(|| {
                m.tool_calls
                    .iter()
                    .map(|call| ChatToolCall {
                        id: call.id.clone(),
                        kind: "function".into(),
                        function: ChatFunction {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: m.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ChatFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolDefinition,
}

impl From<&ToolDefinition> for ChatTool {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: definition.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_providers_resolve() {
        let provider = OpenAiCompatProvider::known("ollama", "").unwrap();
        assert_eq!(provider.name(), "ollama");
        assert!(provider.base_url.contains("localhost:11434"));
        assert!(OpenAiCompatProvider::known("mystery", "k").is_none());
    }

    #[test]
    fn trailing_slash_trimmed() {
        let provider = OpenAiCompatProvider::new("custom", "http://localhost:8000/v1/", "");
        assert_eq!(provider.endpoint("models"), "http://localhost:8000/v1/models");
    }

    #[test]
    fn request_body_shape() {
        let mut request = ProviderRequest::new(
            "gpt-4o-mini",
            vec![Message::system("You are a weather expert"), Message::user("Tokyo in April?")],
        );
        request.tools = vec![ToolDefinition {
            name: "analyze_weather_and_seasons".into(),
            description: "Weather analysis".into(),
            parameters: json!({"type": "object"}),
        }];

        let body = serde_json::to_value(OpenAiCompatProvider::build_body(&request)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Tokyo in April?");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "analyze_weather_and_seasons");
        assert_eq!(body["stream"], false);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn tool_exchange_round_trips_ids() {
        let mut call = Message::assistant("");
        call.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: "find_flight_options".into(),
            arguments: r#"{"origin":"NYC"}"#.into(),
        }];
        let result = Message::tool_result("call_1", "find_flight_options", "{}");

        let call = serde_json::to_value(ChatMessage::from(&call)).unwrap();
        let result = serde_json::to_value(ChatMessage::from(&result)).unwrap();
        assert_eq!(call["tool_calls"][0]["id"], "call_1");
        assert_eq!(call["tool_calls"][0]["type"], "function");
        assert_eq!(result["role"], "tool");
        assert_eq!(result["tool_call_id"], "call_1");
    }

    #[test]
    fn parse_function_call_response() {
        let raw = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": null, "tool_calls": [
                {"id": "call_9", "type": "function", "function": {"name": "find_flight_options", "arguments": "{\"origin\":\"NYC\"}"}}
            ]}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let response = OpenAiCompatProvider::parse_response(parsed).unwrap();
        let call = response.function_call().unwrap();
        assert_eq!(call.id, "call_9");
        assert_eq!(call.name, "find_flight_options");
        assert!(response.text().is_none());
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn empty_choices_is_malformed() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"model": "m", "choices": []}"#).unwrap();
        let err = OpenAiCompatProvider::parse_response(parsed).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
