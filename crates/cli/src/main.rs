//! Wayfarer CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write the default config file
//! - `plan`    — Interactive intake, planning and follow-ups
//! - `demo`    — Plan a prefilled Sydney → Hong Kong trip

use clap::{Parser, Subcommand};

mod commands;
mod console;
mod export;
mod render;

#[derive(Parser)]
#[command(
    name = "wayfarer",
    about = "Wayfarer — multi-agent travel planner",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Plan a trip interactively
    Plan {
        /// Do not write the finished plan to disk
        #[arg(long)]
        no_export: bool,
    },

    /// Run planning on a prefilled example trip
    Demo {
        /// Do not write the finished plan to disk
        #[arg(long)]
        no_export: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Plan { no_export } => commands::plan::run(no_export).await?,
        Commands::Demo { no_export } => commands::demo::run(no_export).await?,
    }

    Ok(())
}
