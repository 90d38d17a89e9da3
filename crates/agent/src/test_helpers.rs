//! Shared test helpers: scripted gateways and tool registries.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wayfarer_core::error::ProviderError;
use wayfarer_core::message::{Message, MessageToolCall, Role};
use wayfarer_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use wayfarer_core::tool::ToolRegistry;
use wayfarer_core::topic::Topic;
use wayfarer_tools::AnalysisBackend;

use crate::prompts;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that returns a single text response (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let count = requests.len();

        if count >= responses.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                count,
                responses.len()
            );
        }

        requests.push(request);
        Ok(responses[count].clone())
    }
}

/// Scripted responses per specialist, chosen by the system prompt.
///
/// Specialists may run concurrently, so a single shared queue would hand
/// responses out in a nondeterministic order.
pub struct TopicScriptedProvider {
    scripts: HashMap<Topic, SequentialMockProvider>,
}

impl TopicScriptedProvider {
    pub fn new(scripts: impl IntoIterator<Item = (Topic, Vec<ProviderResponse>)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(topic, responses)| (topic, SequentialMockProvider::new(responses)))
                .collect(),
        }
    }

    pub fn calls_for(&self, topic: Topic) -> usize {
        self.scripts.get(&topic).map_or(0, |s| s.call_count())
    }

    pub fn requests_for(&self, topic: Topic) -> Vec<ProviderRequest> {
        self.scripts.get(&topic).map(|s| s.requests()).unwrap_or_default()
    }
}

fn topic_of(request: &ProviderRequest) -> Option<Topic> {
    let system = request.messages.iter().find(|m| m.role == Role::System)?;
    Topic::ALL
        .into_iter()
        .find(|t| system.content.starts_with(prompts::system_prompt(*t)))
}

#[async_trait::async_trait]
impl Provider for TopicScriptedProvider {
    fn name(&self) -> &str {
        "topic_scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let topic = topic_of(&request).expect("request without a specialist system prompt");
        let script = self
            .scripts
            .get(&topic)
            .unwrap_or_else(|| panic!("no script for {topic}"));
        script.complete(request).await
    }
}

/// Answers every request with the same text.
pub struct StaticTextProvider(pub String);

#[async_trait::async_trait]
impl Provider for StaticTextProvider {
    fn name(&self) -> &str {
        "static_text"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Ok(make_text_response(&self.0))
    }
}

/// Never answers within any reasonable timeout.
pub struct TimeoutProvider;

#[async_trait::async_trait]
impl Provider for TimeoutProvider {
    fn name(&self) -> &str {
        "timeout"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ProviderError::Timeout("unreachable".into()))
    }
}

/// Fails every request with a fixed error.
pub struct FailingProvider {
    error: ProviderError,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(self.error.clone())
    }
}

/// All eight analysis tools, each answering with `analysis`.
pub fn static_tools(analysis: &str) -> ToolRegistry {
    let backend = AnalysisBackend::new(Arc::new(StaticTextProvider(analysis.to_string())), "tool-model");
    wayfarer_tools::default_registry(backend)
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response with tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut message = Message::assistant(thought);
    message.tool_calls = tool_calls;
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 20,
            total_tokens: 30,
        }),
        model: "mock-model".into(),
    }
}

/// Create a single function call with id `call_{name}`.
pub fn make_tool_call(name: &str, arguments: Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.into(),
        arguments: arguments.to_string(),
    }
}
