//! Configuration loading, validation, and management for Wayfarer.
//!
//! Loads configuration from `~/.wayfarer/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.wayfarer/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default model gateway
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Orchestration bounds
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Plan export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("planner", &self.planner)
            .field("export", &self.export)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Bounds on the agent turn protocol and planning fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Per gateway call timeout; an expired call degrades the agent result
    #[serde(default = "default_gateway_timeout_secs")]
    pub gateway_timeout_secs: u64,

    /// Maximum single-call tool rounds in one agent turn
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Number of most recent history entries replayed into each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Run Booking, Routing and Attractions concurrently after Weather
    #[serde(default = "default_true")]
    pub concurrent_specialists: bool,
}

fn default_gateway_timeout_secs() -> u64 {
    60
}
fn default_max_tool_rounds() -> usize {
    2
}
fn default_history_window() -> usize {
    24
}
fn default_true() -> bool {
    true
}

impl PlannerConfig {
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            gateway_timeout_secs: default_gateway_timeout_secs(),
            max_tool_rounds: default_max_tool_rounds(),
            history_window: default_history_window(),
            concurrent_specialists: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory exported plans are written to
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,

    /// Pretty-print the exported JSON
    #[serde(default = "default_true")]
    pub pretty: bool,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
            pretty: true,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.wayfarer/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `WAYFARER_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("WAYFARER_API_KEY")
                .or_else(|| lookup("GEMINI_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("WAYFARER_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("WAYFARER_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".wayfarer")
    }

    /// Full path of the configuration file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.planner.gateway_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "planner.gateway_timeout_secs must be > 0".into(),
            ));
        }

        if self.planner.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "planner.max_tool_rounds must be at least 1".into(),
            ));
        }

        if self.planner.history_window < 2 {
            return Err(ConfigError::ValidationError(
                "planner.history_window must be at least 2".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            planner: PlannerConfig::default(),
            export: ExportConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.planner.max_tool_rounds, 2);
        assert!(config.planner.concurrent_specialists);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.planner.history_window, config.planner.history_window);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_tool_rounds_rejected() {
        let mut config = AppConfig::default();
        config.planner.max_tool_rounds = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_tool_rounds"));
    }

    #[test]
    fn tiny_history_window_rejected() {
        let mut config = AppConfig::default();
        config.planner.history_window = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.default_provider, "gemini");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_model = \"gemini-2.0-flash\"\n\n[planner]\ngateway_timeout_secs = 5").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.planner.gateway_timeout(), Duration::from_secs(5));
        assert_eq!(config.planner.history_window, 24);
        assert!(config.export.pretty);
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "planner = 3").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_follow_priority() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| match key {
            "GEMINI_API_KEY" => Some("gem-key".into()),
            "OPENAI_API_KEY" => Some("oa-key".into()),
            "WAYFARER_MODEL" => Some("gemini-2.5-pro".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("gem-key"));
        assert_eq!(config.default_model, "gemini-2.5-pro");
        assert_eq!(config.default_provider, "gemini");
    }

    #[test]
    fn file_key_wins_over_env() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env_overrides(|_| Some("from-env".into()));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gemini"));
        assert!(toml_str.contains("[planner]"));
    }
}
