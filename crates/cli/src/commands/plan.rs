//! `wayfarer plan` — Interactive trip planning.

use wayfarer_agent::{Field, Planner, PlanningOutcome, PromptKey};
use wayfarer_config::AppConfig;

use crate::console::Console;
use crate::{export, render};

pub async fn run(no_export: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut planner) = super::build_planner()?;
    let progress = super::spawn_progress(planner.events());
    let mut console = Console::start();

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      Wayfarer — Multi-Agent Trip Planner     ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Type 'exit' or press Ctrl+C at any prompt to quit.");
    println!("  Ctrl+C while the specialists work cancels planning.");
    println!();

    let finished = session(&config, &mut planner, &mut console, no_export).await;
    progress.abort();

    match finished? {
        true => println!("\n  🎯 Your travel plan is complete. Safe travels! 🧳✈️\n"),
        false => println!("\n  Goodbye! 👋\n"),
    }
    Ok(())
}

/// Drive one session. `Ok(false)` means the user left early.
async fn session(
    config: &AppConfig,
    planner: &mut Planner,
    console: &mut Console,
    no_export: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        if !intake(planner, console).await {
            return Ok(false);
        }

        let Some(trip) = planner.trip() else {
            return Err("intake finished without a complete trip".into());
        };
        render::print_trip(&trip);
        println!("\n  🚀 My expert agents are analyzing your requirements...\n");

        match planner.plan(super::ctrl_c()).await? {
            PlanningOutcome::Completed { .. } => break,
            PlanningOutcome::Aborted => {
                println!("\n  ⏹️  Planning cancelled. Nothing was added to your plan.");
                match console.confirm("Start planning again?").await {
                    Some(true) => continue,
                    _ => return Ok(false),
                }
            }
        }
    }

    render::print_plan(planner.plan_so_far());
    let extras = planner.extras().await?;
    render::print_extras(&extras);

    // Refinement
    loop {
        let Some(line) = console
            .ask("🤔 Anything to change or expand? (ask a question, or 'done'):")
            .await
        else {
            break;
        };
        if matches!(line.to_lowercase().as_str(), "done" | "no" | "n") {
            break;
        }
        println!("\n  🔄 Let me get more specific information...");
        let section = planner.follow_up(&line).await?;
        render::print_section(section);
    }

    let finalized = planner.finalize()?;
    if !no_export && let Some(trip) = planner.trip() {
        match export::write(&config.export, &trip, &finalized, Some(&extras)) {
            Ok(path) => println!("\n  💾 Travel plan saved to: {}", path.display()),
            Err(e) => println!("\n  ❌ Could not save the travel plan: {e}"),
        }
    }
    planner.end()?;
    Ok(true)
}

/// Ask questions until the machine is ready. `false` if the user left.
async fn intake(planner: &mut Planner, console: &mut Console) -> bool {
    loop {
        let field = match planner.current_prompt_key() {
            PromptKey::Ask(field) => field,
            _ => return planner.is_ready(),
        };

        let Some(mut answer) = console.ask(render::question(field)).await else {
            return false;
        };

        if field == Field::DateMode {
            answer = match answer.to_lowercase().as_str() {
                "y" | "yes" => "flexible".to_string(),
                "n" | "no" => "fixed".to_string(),
                _ => answer,
            };
        }

        match planner.submit_answer(field, &answer) {
            Ok(PromptKey::Ask(Field::CandidateMonth)) => {
                println!("\n  🌤️  Let me check the best times to visit...\n");
                if let Ok(advice) = planner.recommend_travel_window().await {
                    for line in advice.narrative.lines() {
                        println!("  {line}");
                    }
                    println!();
                }
            }
            Ok(_) => {}
            Err(e) => println!("  ❌ {e}"),
        }
    }
}
