pub mod demo;
pub mod onboard;
pub mod plan;

use std::sync::Arc;
use tokio::sync::broadcast;
use wayfarer_agent::Planner;
use wayfarer_config::AppConfig;
use wayfarer_core::event::{DomainEvent, EventBus};

/// Load config, check credentials and assemble a planner over the default
/// provider.
pub fn build_planner() -> Result<(AppConfig, Planner), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Fail early with setup hints when no key is configured
    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    WAYFARER_API_KEY   (generic)");
        eprintln!("    GEMINI_API_KEY     (for Gemini, the default provider)");
        eprintln!("    OPENAI_API_KEY     (for OpenAI)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = wayfarer_providers::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;
    let planner = Planner::new(provider, &config)?;
    Ok((config, planner))
}

/// Print specialist progress while planning runs.
pub fn spawn_progress(events: Arc<EventBus>) -> tokio::task::JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match event.as_ref() {
                DomainEvent::AgentInvoked { agent, .. } => println!("  ... {agent} is working"),
                DomainEvent::ToolExecuted {
                    tool_name,
                    success: true,
                    duration_ms,
                    ..
                } => println!("      used {tool_name} ({duration_ms} ms)"),
                DomainEvent::AgentDegraded { topic, reason, .. } => {
                    println!("  ⚠️  {topic} section degraded: {reason}")
                }
                _ => {}
            }
        }
    })
}

/// Resolves when the user presses Ctrl+C.
pub async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available: never cancel
        std::future::pending::<()>().await;
    }
}
