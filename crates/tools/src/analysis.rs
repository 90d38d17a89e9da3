//! Gateway-backed analysis tools.
//!
//! Every travel tool works the same way: render an expert prompt from the
//! validated arguments, ask the model for an analysis, and return a record
//! that echoes the inputs alongside the generated text. Only the prompt and
//! the name of the output field differ, so each tool is an [`AnalysisSpec`]
//! executed by one generic [`AnalysisTool`].

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use wayfarer_core::error::ToolError;
use wayfarer_core::message::Message;
use wayfarer_core::provider::{Provider, ProviderRequest};
use wayfarer_core::tool::{Tool, ToolParam, ToolResult};

/// Static description of one analysis tool.
pub struct AnalysisSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ToolParam],
    /// Key under which the generated analysis is stored in the result record
    pub output_field: &'static str,
    /// Renders the expert prompt from validated arguments
    pub prompt: fn(&Value) -> String,
}

/// Model used by analysis tools.
#[derive(Clone)]
pub struct AnalysisBackend {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub max_tokens: Option<u32>,
}

impl AnalysisBackend {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: None,
        }
    }
}

/// A tool that answers by asking the model for an expert analysis.
pub struct AnalysisTool {
    spec: &'static AnalysisSpec,
    backend: AnalysisBackend,
}

impl AnalysisTool {
    pub fn new(spec: &'static AnalysisSpec, backend: AnalysisBackend) -> Self {
        Self { spec, backend }
    }

    fn failed(&self, reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: self.spec.name.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tool for AnalysisTool {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn description(&self) -> &str {
        self.spec.description
    }

    fn params(&self) -> &[ToolParam] {
        self.spec.params
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let prompt = (self.spec.prompt)(&arguments);
        debug!(tool = self.spec.name, model = %self.backend.model, "Requesting analysis");

        let mut request = ProviderRequest::new(&self.backend.model, vec![Message::user(prompt)]);
        request.max_tokens = self.backend.max_tokens;

        let response = self
            .backend
            .provider
            .complete(request)
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        let analysis = response
            .text()
            .ok_or_else(|| self.failed("model returned an empty analysis"))?
            .to_string();

        let mut record = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        record.insert(self.spec.output_field.to_string(), Value::String(analysis));
        record.insert(
            "generated_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        let data = Value::Object(record);

        Ok(ToolResult {
            call_id: String::new(),
            output: data.to_string(),
            data,
        })
    }
}

// --- argument accessors for prompt builders (arguments are pre-validated) ---

pub(crate) fn text(args: &Value, key: &str) -> String {
    args[key].as_str().unwrap_or_default().to_string()
}

pub(crate) fn list(args: &Value, key: &str) -> String {
    args[key]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

pub(crate) fn integer(args: &Value, key: &str, default: i64) -> i64 {
    args[key].as_i64().unwrap_or(default)
}
