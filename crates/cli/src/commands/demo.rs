//! `wayfarer demo` — Plan a prefilled trip without the intake dialogue.

use wayfarer_agent::{Field, Planner, PlanningOutcome};

use crate::{export, render};

/// Sydney → Hong Kong, three days in mid-June.
pub const DEMO_ANSWERS: [(Field, &str); 9] = [
    (Field::Origin, "Sydney"),
    (Field::Destination, "Hong Kong"),
    (Field::DateMode, "fixed"),
    (Field::ConcreteDates, "2025-06-15, 2025-06-18"),
    (Field::DurationDays, "3"),
    (Field::ActivityPreference, "mixed"),
    (Field::Interests, "nightlife, food, beach"),
    (Field::BudgetTier, "medium"),
    (Field::LodgingType, "hotel"),
];

pub fn fill(planner: &mut Planner) -> Result<(), Box<dyn std::error::Error>> {
    for (field, value) in DEMO_ANSWERS {
        planner.submit_answer(field, value)?;
    }
    Ok(())
}

pub async fn run(no_export: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut planner) = super::build_planner()?;
    let progress = super::spawn_progress(planner.events());

    println!("\n  🎬 Wayfarer demo: Sydney → Hong Kong\n");
    fill(&mut planner)?;
    let trip = planner.trip().ok_or("demo trip is incomplete")?;
    render::print_trip(&trip);
    println!();

    let outcome = planner.plan(super::ctrl_c()).await?;
    if outcome == PlanningOutcome::Aborted {
        progress.abort();
        println!("\n  ⏹️  Demo cancelled.\n");
        return Ok(());
    }

    render::print_plan(planner.plan_so_far());
    let extras = planner.extras().await?;
    render::print_extras(&extras);
    progress.abort();

    let finalized = planner.finalize()?;
    if !no_export {
        match export::write(&config.export, &trip, &finalized, Some(&extras)) {
            Ok(path) => println!("\n  💾 Travel plan saved to: {}", path.display()),
            Err(e) => println!("\n  ❌ Could not save the travel plan: {e}"),
        }
    }
    planner.end()?;
    println!();
    Ok(())
}
