//! Google Gemini provider (`generateContent`).
//!
//! Function declarations go under `tools[].function_declarations`; the model
//! answers with `functionCall` parts, and tool results are sent back as
//! `functionResponse` parts on a user turn. System messages are sent as the
//! request's `systemInstruction`, never inside `contents`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use wayfarer_core::error::ProviderError;
use wayfarer_core::message::{Message, MessageToolCall, Role};
use wayfarer_core::provider::*;
use crate::http::{build_client, check_status, transport_error};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini model gateway.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            client: build_client(),
        }
    }

    /// Point at a different API root (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request_body(request: &ProviderRequest) -> Value {
        let mut body = json!({
            "contents": Self::convert_messages(&request.messages),
        });
        if let Some(instruction) = Self::system_instruction(&request.messages) {
            body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
        }

        let mut generation_config = json!({ "temperature": request.temperature });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        body["generationConfig"] = generation_config;

        if !request.tools.is_empty() {
            body["tools"] = json!([{
                "function_declarations": request.tools.iter().map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                }).collect::<Vec<_>>()
            }]);
        }

        body
    }

    /// All system fragments joined into one instruction.
    fn system_instruction(messages: &[Message]) -> Option<String> {
        let fragments: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        (!fragments.is_empty()).then(|| fragments.join("\n\n"))
    }

    fn convert_messages(messages: &[Message]) -> Vec<Value> {
        let mut contents = Vec::new();

        for m in messages {
            match m.role {
                Role::System => {}
                Role::User => {
                    contents.push(json!({ "role": "user", "parts": [{ "text": m.content }] }));
                }
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !m.content.is_empty() {
                        parts.push(json!({ "text": m.content }));
                    }
                    for tc in &m.tool_calls {
                        let args: Value = serde_json::from_str(&tc.arguments)
                            .unwrap_or_else(|_| json!({}));
                        parts.push(json!({
                            "functionCall": { "name": tc.name, "args": args }
                        }));
                    }
                    if !parts.is_empty() {
                        contents.push(json!({ "role": "model", "parts": parts }));
                    }
                }
                Role::Tool => {
                    let tool_name = m.tool_name.clone().unwrap_or_else(|| "tool".to_string());
                    let response_value: Value = serde_json::from_str(&m.content)
                        .ok()
                        .filter(Value::is_object)
                        .unwrap_or_else(|| json!({ "result": m.content }));
                    contents.push(json!({
                        "role": "user",
                        "parts": [{
                            "functionResponse": { "name": tool_name, "response": response_value }
                        }]
                    }));
                }
            }
        }

        contents
    }

    fn parse_response(response: GeminiResponse, model: &str) -> Result<ProviderResponse, ProviderError> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("No candidates in response".into()))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.and_then(|c| c.parts).unwrap_or_default() {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(fc) = part.function_call {
                let args = fc.args.unwrap_or_else(|| json!({}));
                tool_calls.push(MessageToolCall {
                    id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                    name: fc.name,
                    arguments: args.to_string(),
                });
            }
        }

        if content.is_empty() && tool_calls.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".into());
            return Err(ProviderError::MalformedResponse(format!(
                "Candidate has no text or function call (finish reason: {reason})"
            )));
        }

        let mut message = Message::assistant(content);
        message.tool_calls = tool_calls;

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count.unwrap_or(0),
            completion_tokens: u.candidates_token_count.unwrap_or(0),
            total_tokens: u.total_token_count.unwrap_or(0),
        });

        Ok(ProviderResponse {
            message,
            usage,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key missing (set GEMINI_API_KEY or api_key in config)".into(),
            ));
        }

        let body = Self::build_request_body(&request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        debug!(provider = "gemini", model = %request.model, tools = request.tools.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status("gemini", response).await?;

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        Self::parse_response(gemini_response, &request.model)
    }
}

// --- Gemini API response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}
