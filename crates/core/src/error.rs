//! Gateway and dispatch failures.
//!
//! Neither of these ever reaches the traveler as a hard error: a specialist
//! turns them into a degraded section. Intake validation and plan
//! aggregation have their own errors in `wayfarer-agent`.

use thiserror::Error;

/// Failures of a single Model Gateway round trip.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The gateway answered, but not with text or a usable function call
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Failures raised while dispatching a function call to an analysis tool.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The model asked for a tool the specialist was never given
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Arguments did not match the declared schema
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}
