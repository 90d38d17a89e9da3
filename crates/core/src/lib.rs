//! # Wayfarer Core
//!
//! Domain types, traits, and error definitions for the Wayfarer travel
//! planner. Every other crate depends inward on this one.
//!
//! ## Design Philosophy
//!
//! The Model Gateway ([`Provider`]) and the analysis functions ([`Tool`]) are
//! traits here; implementations live in their own crates. This enables:
//! - Swapping the hosted model via configuration
//! - Testing agents with scripted gateways
//! - A clean dependency graph

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod tool;
pub mod topic;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{ArgType, Tool, ToolCall, ToolParam, ToolRegistry, ToolResult};
pub use topic::Topic;
