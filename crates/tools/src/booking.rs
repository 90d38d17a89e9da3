//! Flight and accommodation analyses.

use serde_json::Value;
use wayfarer_core::tool::{ArgType, ToolParam};
use crate::analysis::{AnalysisSpec, list, text};

pub static FIND_FLIGHT_OPTIONS: AnalysisSpec = AnalysisSpec {
    name: "find_flight_options",
    description: "Describe routes, airlines, price ranges and booking strategy for a flight.",
    params: &[
        ToolParam::required("origin", ArgType::String, "Departure city"),
        ToolParam::required("destination", ArgType::String, "Arrival city"),
        ToolParam::required("travel_date", ArgType::String, "Departure date (YYYY-MM-DD) or month"),
        ToolParam::required("budget_range", ArgType::String, "low, medium or high"),
    ],
    output_field: "flight_analysis",
    prompt: flight_prompt,
};

pub static FIND_ACCOMMODATION_OPTIONS: AnalysisSpec = AnalysisSpec {
    name: "find_accommodation_options",
    description: "Recommend neighborhoods, lodging options and prices for a stay.",
    params: &[
        ToolParam::required("location", ArgType::String, "City to stay in"),
        ToolParam::required("dates", ArgType::StringList, "Check-in and check-out dates"),
        ToolParam::required("accommodation_type", ArgType::String, "hotel, hostel, apartment, ..."),
        ToolParam::required("budget_range", ArgType::String, "low, medium or high"),
    ],
    output_field: "accommodation_analysis",
    prompt: accommodation_prompt,
};

fn flight_prompt(args: &Value) -> String {
    let origin = text(args, "origin");
    let destination = text(args, "destination");
    let date = text(args, "travel_date");
    let budget = text(args, "budget_range");
    format!(
        "As a travel booking expert, provide flight information for:
- Route: {origin} to {destination}
- Date: {date}
- Budget: {budget}

Include:
1. Typical flight duration and routes
2. Major airlines serving this route
3. Expected price ranges for a {budget} budget
4. Booking strategy and timing
5. Alternative airports
6. Layover cities and connections
7. Peak vs off-peak pricing
8. Tips for finding deals"
    )
}

fn accommodation_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let dates = list(args, "dates");
    let kind = text(args, "accommodation_type");
    let budget = text(args, "budget_range");
    format!(
        "As a travel accommodation expert, advise on staying in {location}:
- Dates: {dates}
- Type: {kind}
- Budget: {budget}

Include:
1. Best neighborhoods to stay in
2. Typical prices for a {budget} budget
3. Recommended accommodation types and brands
4. Booking platforms and strategies
5. Expected amenities
6. Safety and location considerations
7. Transport access from each area
8. Local tips for finding deals"
    )
}
