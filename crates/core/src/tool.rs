//! Tool trait — the abstraction over callable analysis functions.
//!
//! Each tool declares a name, a description and an argument schema made of
//! simple semantic types. The registry checks incoming arguments against that
//! schema before the tool runs, so tools only ever see well-typed input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the model's function call id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Human-readable output fed back to the model
    pub output: String,

    /// Structured record produced by the tool
    pub data: serde_json::Value,
}

/// Semantic type of a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    String,
    Integer,
    StringList,
}

impl ArgType {
    fn json_schema(self) -> serde_json::Value {
        match self {
            ArgType::String => serde_json::json!({ "type": "string" }),
            ArgType::Integer => serde_json::json!({ "type": "integer" }),
            ArgType::StringList => serde_json::json!({
                "type": "array",
                "items": { "type": "string" }
            }),
        }
    }

    fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.is_string())),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Integer => "integer",
            ArgType::StringList => "list of strings",
        }
    }
}

/// One declared argument of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolParam {
    pub name: &'static str,
    pub kind: ArgType,
    pub description: &'static str,
    pub required: bool,
}

impl ToolParam {
    pub const fn required(name: &'static str, kind: ArgType, description: &'static str) -> Self {
        Self { name, kind, description, required: true }
    }

    pub const fn optional(name: &'static str, kind: ArgType, description: &'static str) -> Self {
        Self { name, kind, description, required: false }
    }
}

/// Check `arguments` against a declared parameter list.
///
/// Arguments must be a JSON object; required parameters must be present;
/// every present parameter must match its declared type; unknown keys are
/// rejected.
pub fn validate_arguments(params: &[ToolParam], arguments: &serde_json::Value) -> Result<(), ToolError> {
    let Some(object) = arguments.as_object() else {
        return Err(ToolError::InvalidArguments("arguments must be a JSON object".into()));
    };

    for key in object.keys() {
        if !params.iter().any(|p| p.name == key.as_str()) {
            return Err(ToolError::InvalidArguments(format!("unexpected argument '{key}'")));
        }
    }

    for param in params {
        match object.get(param.name) {
            None | Some(serde_json::Value::Null) if param.required => {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required argument '{}'",
                    param.name
                )));
            }
            Some(value) if !value.is_null() && !param.kind.accepts(value) => {
                return Err(ToolError::InvalidArguments(format!(
                    "argument '{}' must be a {}",
                    param.name,
                    param.kind.label()
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

/// The core Tool trait.
///
/// Tools are registered in a [`ToolRegistry`] and bound to agents by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "find_flight_options").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// The declared argument schema.
    fn params(&self) -> &[ToolParam];

    /// Execute the tool with arguments that already passed validation.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// JSON Schema derived from [`Tool::params`].
    fn parameters_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .params()
            .iter()
            .map(|p| {
                let mut schema = p.kind.json_schema();
                schema["description"] = serde_json::Value::String(p.description.to_string());
                (p.name.to_string(), schema)
            })
            .collect();
        let required: Vec<&str> = self
            .params()
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Agents use this to:
/// 1. Get tool declarations to send to the model
/// 2. Validate and execute the calls the model requests
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// A new registry holding only the named tools.
    ///
    /// Fails if any name is not registered here.
    pub fn subset(&self, names: &[&str]) -> Result<ToolRegistry, ToolError> {
        let mut bound = ToolRegistry::new();
        for name in names {
            let tool = self
                .tools
                .get(*name)
                .ok_or_else(|| ToolError::NotFound((*name).to_string()))?;
            bound.register(tool.clone());
        }
        Ok(bound)
    }

    /// Get all tool declarations, in name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Validate and execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        validate_arguments(tool.params(), &call.arguments)?;
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// List all registered tool names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
