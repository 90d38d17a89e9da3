//! Provider router — selects the model gateway based on config.

use std::collections::HashMap;
use std::sync::Arc;
use wayfarer_core::provider::Provider;
use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Holds the configured gateways, keyed by provider name.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

fn build_provider(name: &str, api_key: &str, api_url: Option<&str>) -> Arc<dyn Provider> {
    match (name, api_url) {
        ("gemini", None) => Arc::new(GeminiProvider::new(api_key)),
        ("gemini", Some(url)) => Arc::new(GeminiProvider::new(api_key).with_base_url(url)),
        (_, Some(url)) => Arc::new(OpenAiCompatProvider::new(name, url, api_key)),
        (_, None) => Arc::new(
            OpenAiCompatProvider::known(name, api_key)
                .unwrap_or_else(|| OpenAiCompatProvider::new(name, fallback_base_url(name), api_key)),
        ),
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &wayfarer_config::AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        router.register(
            name.clone(),
            build_provider(name, &api_key, provider_config.api_url.as_deref()),
        );
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let api_key = config.api_key.clone().unwrap_or_default();
        router.register(
            config.default_provider.clone(),
            build_provider(&config.default_provider, &api_key, None),
        );
    }

    router
}

/// Guess for OpenAI-compatible providers missing from the known list.
fn fallback_base_url(provider_name: &str) -> String {
    format!("https://{provider_name}.api.example.com/v1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_config::{AppConfig, ProviderConfig};

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        router.register("openai", build_provider("openai", "sk-test", None));

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn unknown_provider_falls_back_to_openai_shape() {
        let provider = build_provider("acme", "k", None);
        assert_eq!(provider.name(), "acme");
        assert_eq!(fallback_base_url("acme"), "https://acme.api.example.com/v1");
    }

    #[test]
    fn build_from_default_config_uses_gemini() {
        let router = build_from_config(&AppConfig::default());
        let provider = router.default().unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn configured_providers_are_registered() {
        let mut config = AppConfig::default();
        config.default_provider = "ollama".into();
        config.providers.insert("ollama".into(), ProviderConfig::default());

        let router = build_from_config(&config);
        assert_eq!(router.default().unwrap().name(), "ollama");
        assert_eq!(router.list(), vec!["ollama"]);
    }
}
