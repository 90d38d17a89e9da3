//! Local transport and itinerary analyses.

use serde_json::Value;
use wayfarer_core::tool::{ArgType, ToolParam};
use crate::analysis::{AnalysisSpec, integer, list, text};

pub static GET_TRAFFIC_AND_TRANSPORT_INSIGHTS: AnalysisSpec = AnalysisSpec {
    name: "get_traffic_and_transport_insights",
    description: "Explain public transport, traffic patterns and getting around a city.",
    params: &[
        ToolParam::required("location", ArgType::String, "City to analyze"),
        ToolParam::required("time_preference", ArgType::String, "day, night or mixed"),
    ],
    output_field: "transport_analysis",
    prompt: transport_prompt,
};

pub static CREATE_OPTIMIZED_ROUTE: AnalysisSpec = AnalysisSpec {
    name: "create_optimized_route",
    description: "Build a day-by-day itinerary that minimizes travel between stops.",
    params: &[
        ToolParam::required("location", ArgType::String, "City to plan in"),
        ToolParam::required("interests", ArgType::StringList, "Traveler interests"),
        ToolParam::required("duration_days", ArgType::Integer, "Number of days"),
        ToolParam::required("time_preference", ArgType::String, "day, night or mixed"),
    ],
    output_field: "optimized_itinerary",
    prompt: route_prompt,
};

fn transport_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let time = text(args, "time_preference");
    format!(
        "As a local transportation expert for {location}, describe:
1. Public transport systems (metro, buses, trains)
2. Traffic patterns during {time} hours
3. Best ways to get around
4. Costs and payment methods
5. Rush hour timing
6. Walkability of different areas
7. Taxi and rideshare availability
8. Useful transport apps
9. Safety considerations per mode"
    )
}

fn route_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let interests = list(args, "interests");
    let days = integer(args, "duration_days", 1);
    let time = text(args, "time_preference");
    format!(
        "As a local tour guide for {location}, create an optimized {days}-day itinerary.

Requirements:
- Interests: {interests}
- Time preference: {time} activities
- Minimize travel time between locations

For each day give morning, afternoon and evening activities with timing,
transport between stops, meal suggestions, rest periods, bad-weather
alternatives, estimated costs and insider tips."
    )
}
