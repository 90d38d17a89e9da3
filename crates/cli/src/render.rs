//! Terminal rendering of prompts, plans and extras.

use wayfarer_agent::{ConciergeNote, Extras, Field, PlanSection, TravelPlan, TripRequest};

/// Question shown for each intake field.
pub fn question(field: Field) -> &'static str {
    match field {
        Field::Origin => "🏠 Where are you traveling from?",
        Field::Destination => "🌍 Where would you like to go?",
        Field::DateMode => "📅 Are your travel dates flexible?",
        Field::CandidateMonth => "🗓️  Which month would you like to travel?",
        Field::ConcreteDates => "📆 Travel dates (YYYY-MM-DD, YYYY-MM-DD):",
        Field::DurationDays => "⏱️  How many days will you stay?",
        Field::ActivityPreference => "🌞 Do you prefer day, night or mixed activities?",
        Field::Interests => "🎯 What are your interests? (comma separated)",
        Field::BudgetTier => "💰 Budget (low/medium/high):",
        Field::LodgingType => "🏨 Preferred accommodation type? (hotel/hostel/apartment/...)",
    }
}

pub fn rule() {
    println!("  {}", "─".repeat(60));
}

pub fn print_trip(trip: &TripRequest) {
    println!();
    println!("  📋 TRIP OVERVIEW");
    rule();
    println!("  From:       {}", trip.origin);
    println!("  To:         {}", trip.destination);
    println!("  Dates:      {} ({}, {})", trip.dates, trip.travel_month(), trip.season());
    println!("  Duration:   {} days", trip.duration_days);
    println!("  Activities: {}", trip.activity_preference.as_str());
    println!("  Interests:  {}", trip.interest_list().join(", "));
    println!("  Budget:     {}", trip.budget_tier.as_str());
    println!("  Stay:       {}", trip.lodging_type);
}

pub fn print_section(section: &PlanSection) {
    println!();
    let marker = if section.degraded.is_some() { " (degraded)" } else { "" };
    println!("  {}{} — {}", section.title.to_uppercase(), marker, section.agent);
    rule();
    for line in section.narrative.lines() {
        println!("  {line}");
    }
}

pub fn print_plan(plan: &TravelPlan) {
    println!();
    println!("  {}", "=".repeat(60));
    println!("  🎉 YOUR PERSONALIZED TRAVEL PLAN 🎉");
    println!("  {}", "=".repeat(60));
    for section in plan.sections() {
        print_section(section);
    }
}

fn print_note(heading: &str, note: &ConciergeNote) {
    println!();
    println!("  {heading}");
    rule();
    for line in note.text.lines() {
        println!("  {line}");
    }
}

pub fn print_extras(extras: &Extras) {
    print_note("💡 PERSONALIZED TRAVEL TIPS", &extras.tips);
    print_note("✅ TRAVEL CHECKLIST", &extras.checklist);
    print_note("💵 BUDGET ESTIMATE", &extras.budget);
}
