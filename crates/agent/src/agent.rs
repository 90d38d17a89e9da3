//! Specialist agents and the tool-call dispatch protocol.
//!
//! A turn is an explicit sequence of phases rather than recursion:
//!
//! ```text
//! AwaitingModel{0} ──text──────────────────────────────────────→ Completed
//!        │
//!        └─function call→ AwaitingToolResult ─result→ AwaitingModel{1} → ...
//! ```
//!
//! Each round executes exactly one function call. Once `max_tool_rounds`
//! rounds have run, the next gateway request declares no tools, so the model
//! has to answer in prose. Gateway and dispatch failures end the turn with a
//! degraded [`AgentResult`]; they are never returned as errors.
//!
//! Entries produced during a turn are staged and committed to the agent's
//! history only when the turn finishes, so a turn dropped mid-flight leaves
//! the history untouched.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wayfarer_config::AppConfig;
use wayfarer_core::error::{ProviderError, ToolError};
use wayfarer_core::event::{DomainEvent, EventBus};
use wayfarer_core::message::Message;
use wayfarer_core::provider::{Provider, ProviderRequest, ProviderResponse};
use wayfarer_core::tool::{ToolCall, ToolRegistry};
use wayfarer_core::topic::Topic;

use crate::history::{EntryContent, History, Speaker, entry_message};
use crate::prompts;

/// Gateway parameters shared by every specialist.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Bound on a single gateway round trip or tool execution
    pub gateway_timeout: Duration,
    /// Single-call tool rounds allowed per turn
    pub max_tool_rounds: usize,
    /// History entries replayed into each prompt
    pub history_window: usize,
}

impl AgentSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            max_tokens: Some(config.default_max_tokens),
            gateway_timeout: config.planner.gateway_timeout(),
            max_tool_rounds: config.planner.max_tool_rounds,
            history_window: config.planner.history_window,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Why a turn could not produce a full answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    Timeout,
    RateLimited,
    Authentication,
    Network,
    MalformedResponse,
    Gateway,
    Dispatch,
}

impl fmt::Display for DegradationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timed out",
            Self::RateLimited => "rate limited",
            Self::Authentication => "not authorized",
            Self::Network => "network failure",
            Self::MalformedResponse => "malformed response",
            Self::Gateway => "gateway error",
            Self::Dispatch => "tool dispatch failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    pub kind: DegradationKind,
    pub message: String,
}

impl Degradation {
    pub fn new(kind: DegradationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn timeout(what: &str, after: Duration) -> Self {
        Self::new(
            DegradationKind::Timeout,
            format!("{what} did not finish within {}s", after.as_secs()),
        )
    }
}

impl From<ProviderError> for Degradation {
    fn from(e: ProviderError) -> Self {
        let kind = match &e {
            ProviderError::Timeout(_) => DegradationKind::Timeout,
            ProviderError::RateLimited { .. } => DegradationKind::RateLimited,
            ProviderError::AuthenticationFailed(_) | ProviderError::NotConfigured(_) => {
                DegradationKind::Authentication
            }
            ProviderError::Network(_) => DegradationKind::Network,
            ProviderError::MalformedResponse(_) => DegradationKind::MalformedResponse,
            ProviderError::ApiError { .. } => DegradationKind::Gateway,
        };
        Self::new(kind, e.to_string())
    }
}

impl From<ToolError> for Degradation {
    fn from(e: ToolError) -> Self {
        Self::new(DegradationKind::Dispatch, e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

/// One function call consumed during a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: Value,
    pub outcome: ToolOutcome,
}

/// What a specialist turn produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult {
    pub topic: Topic,
    pub agent: String,
    pub narrative: String,
    /// Successful tool records keyed by tool name; absent when degraded or
    /// when no tool ran
    pub payload: Option<Value>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub degraded: Option<Degradation>,
}

impl AgentResult {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

enum TurnPhase {
    AwaitingModel { round: usize },
    AwaitingToolResult { call: ToolCall, round: usize },
    Completed { narrative: String },
}

/// A named specialist bound to one topic and its tools.
pub struct SpecialistAgent {
    name: String,
    topic: Topic,
    system_prompt: String,
    tools: ToolRegistry,
    history: History,
    provider: Arc<dyn Provider>,
    settings: AgentSettings,
    event_bus: Option<Arc<EventBus>>,
}

impl SpecialistAgent {
    pub fn new(
        topic: Topic,
        provider: Arc<dyn Provider>,
        tools: ToolRegistry,
        settings: AgentSettings,
    ) -> Self {
        Self {
            name: prompts::agent_name(topic).to_string(),
            topic,
            system_prompt: format!("{}\n\n{}", prompts::system_prompt(topic), prompts::TOOL_GUIDANCE),
            tools,
            history: History::new(),
            provider,
            settings,
            event_bus: None,
        }
    }

    /// Build the specialist for `topic`, binding its tools out of `registry`.
    pub fn for_topic(
        topic: Topic,
        provider: Arc<dyn Provider>,
        registry: &ToolRegistry,
        settings: AgentSettings,
    ) -> Result<Self, ToolError> {
        let tools = registry.subset(wayfarer_tools::tools_for(topic))?;
        Ok(Self::new(topic, provider, tools, settings))
    }

    pub fn with_events(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// Run one turn for `context`.
    pub async fn respond(&mut self, context: &str) -> AgentResult {
        info!(agent = %self.name, topic = ?self.topic, "Agent turn started");
        self.publish(DomainEvent::AgentInvoked {
            topic: self.topic,
            agent: self.name.clone(),
            timestamp: Utc::now(),
        });

        let mut staged = vec![(Speaker::User, EntryContent::Text(context.to_string()))];
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut phase = TurnPhase::AwaitingModel { round: 0 };

        let outcome = loop {
            phase = match phase {
                TurnPhase::AwaitingModel { round } => {
                    let offer_tools = round < self.settings.max_tool_rounds;
                    let response = match self.call_gateway(&staged, offer_tools).await {
                        Ok(r) => r,
                        Err(d) => break Err(d),
                    };
                    match self.next_phase(response, offer_tools, round) {
                        Ok(TurnPhase::AwaitingToolResult { call, round }) => {
                            staged.push((
                                Speaker::Agent,
                                EntryContent::FunctionCall {
                                    id: call.id.clone(),
                                    name: call.name.clone(),
                                    arguments: call.arguments.clone(),
                                },
                            ));
                            TurnPhase::AwaitingToolResult { call, round }
                        }
                        Ok(next) => next,
                        Err(d) => break Err(d),
                    }
                }
                TurnPhase::AwaitingToolResult { call, round } => {
                    match self.dispatch(&call).await {
                        Ok(data) => {
                            staged.push((
                                Speaker::Tool,
                                EntryContent::ToolOutput {
                                    call_id: call.id.clone(),
                                    tool_name: call.name.clone(),
                                    data: data.clone(),
                                },
                            ));
                            records.push(ToolCallRecord {
                                call_id: call.id,
                                tool_name: call.name,
                                arguments: call.arguments,
                                outcome: ToolOutcome::Success(data),
                            });
                            TurnPhase::AwaitingModel { round: round + 1 }
                        }
                        Err(d) => {
                            records.push(ToolCallRecord {
                                call_id: call.id,
                                tool_name: call.name,
                                arguments: call.arguments,
                                outcome: ToolOutcome::Failure(d.message.clone()),
                            });
                            break Err(d);
                        }
                    }
                }
                TurnPhase::Completed { narrative } => break Ok(narrative),
            };
        };

        match outcome {
            Ok(narrative) => {
                staged.push((Speaker::Agent, EntryContent::Text(narrative.clone())));
                self.history.extend(staged);
                info!(agent = %self.name, tool_calls = records.len(), "Agent turn completed");
                AgentResult {
                    topic: self.topic,
                    agent: self.name.clone(),
                    narrative,
                    payload: payload_from(&records),
                    tool_calls: records,
                    degraded: None,
                }
            }
            Err(degradation) => self.degrade(context, degradation, records),
        }
    }

    /// Decide what follows a gateway response.
    fn next_phase(
        &self,
        response: ProviderResponse,
        offer_tools: bool,
        round: usize,
    ) -> Result<TurnPhase, Degradation> {
        if offer_tools && let Some(fc) = response.function_call() {
            if response.message.tool_calls.len() > 1 {
                debug!(
                    agent = %self.name,
                    requested = response.message.tool_calls.len(),
                    "Several calls requested; executing the first"
                );
            }
            let arguments: Value = serde_json::from_str(&fc.arguments).map_err(|e| {
                Degradation::new(
                    DegradationKind::MalformedResponse,
                    format!("arguments for {} are not JSON: {e}", fc.name),
                )
            })?;
            return Ok(TurnPhase::AwaitingToolResult {
                call: ToolCall {
                    id: fc.id.clone(),
                    name: fc.name.clone(),
                    arguments,
                },
                round,
            });
        }

        match response.text() {
            Some(text) => Ok(TurnPhase::Completed {
                narrative: text.to_string(),
            }),
            None => Err(Degradation::new(
                DegradationKind::MalformedResponse,
                "model returned neither text nor a usable function call",
            )),
        }
    }

    async fn call_gateway(
        &self,
        staged: &[(Speaker, EntryContent)],
        offer_tools: bool,
    ) -> Result<ProviderResponse, Degradation> {
        let mut messages = vec![Message::system(&self.system_prompt)];
        messages.extend(self.history.window_messages(self.settings.history_window));
        messages.extend(staged.iter().map(|(speaker, content)| entry_message(*speaker, content)));

        let mut request = ProviderRequest::new(&self.settings.model, messages);
        request.temperature = self.settings.temperature;
        request.max_tokens = self.settings.max_tokens;
        if offer_tools {
            request.tools = self.tools.definitions();
        }

        debug!(
            agent = %self.name,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Calling model gateway"
        );

        match tokio::time::timeout(self.settings.gateway_timeout, self.provider.complete(request)).await {
            Ok(result) => result.map_err(Degradation::from),
            Err(_) => Err(Degradation::timeout("model gateway", self.settings.gateway_timeout)),
        }
    }

    /// Execute one call against the bound tools.
    async fn dispatch(&self, call: &ToolCall) -> Result<Value, Degradation> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.settings.gateway_timeout, self.tools.execute(call)).await {
            Ok(result) => result.map_err(Degradation::from),
            Err(_) => Err(Degradation::timeout(&call.name, self.settings.gateway_timeout)),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => debug!(agent = %self.name, tool = %call.name, duration_ms, "Tool executed"),
            Err(d) => warn!(agent = %self.name, tool = %call.name, error = %d.message, "Tool execution failed"),
        }
        self.publish(DomainEvent::ToolExecuted {
            agent: self.name.clone(),
            tool_name: call.name.clone(),
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        result.map(|r| r.data)
    }

    /// Close a failed turn: keep the request and an explanatory reply in the
    /// history, drop the half-finished tool exchange.
    fn degrade(&mut self, context: &str, degradation: Degradation, records: Vec<ToolCallRecord>) -> AgentResult {
        warn!(
            agent = %self.name,
            topic = ?self.topic,
            kind = %degradation.kind,
            error = %degradation.message,
            "Agent turn degraded"
        );
        self.publish(DomainEvent::AgentDegraded {
            topic: self.topic,
            reason: degradation.message.clone(),
            timestamp: Utc::now(),
        });

        let narrative = format!(
            "The {} could not complete this part of the plan ({}): {}. The other sections are \
             unaffected; ask again later to retry.",
            self.name, degradation.kind, degradation.message
        );
        self.history.extend(vec![
            (Speaker::User, EntryContent::Text(context.to_string())),
            (Speaker::Agent, EntryContent::Text(narrative.clone())),
        ]);

        AgentResult {
            topic: self.topic,
            agent: self.name.clone(),
            narrative,
            payload: None,
            tool_calls: records,
            degraded: Some(degradation),
        }
    }
}

fn payload_from(records: &[ToolCallRecord]) -> Option<Value> {
    let map: Map<String, Value> = records
        .iter()
        .filter_map(|r| match &r.outcome {
            ToolOutcome::Success(data) => Some((r.tool_name.clone(), data.clone())),
            ToolOutcome::Failure(_) => None,
        })
        .collect();
    (!map.is_empty()).then_some(Value::Object(map))
}
