//! Weather and seasonality analyses.

use serde_json::Value;
use wayfarer_core::tool::{ArgType, ToolParam};
use crate::analysis::{AnalysisSpec, integer, text};

pub static ANALYZE_WEATHER_AND_SEASONS: AnalysisSpec = AnalysisSpec {
    name: "analyze_weather_and_seasons",
    description: "Analyze typical weather, tourist season and packing needs for a location in a given month.",
    params: &[
        ToolParam::required("location", ArgType::String, "City or region to analyze"),
        ToolParam::required("travel_month", ArgType::String, "Month of travel, e.g. \"April\""),
    ],
    output_field: "analysis",
    prompt: weather_prompt,
};

pub static RECOMMEND_BEST_TRAVEL_DATES: AnalysisSpec = AnalysisSpec {
    name: "recommend_best_travel_dates",
    description: "Rank the best months to visit a location within a flexible window.",
    params: &[
        ToolParam::required("location", ArgType::String, "City or region to visit"),
        ToolParam::optional(
            "flexible_window_months",
            ArgType::Integer,
            "How many months ahead the traveler can go (default 6)",
        ),
    ],
    output_field: "recommendations",
    prompt: best_dates_prompt,
};

fn weather_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let month = text(args, "travel_month");
    format!(
        "Analyze the weather and travel conditions for {location} in {month}.

Consider:
1. Typical temperature ranges
2. Rainfall patterns
3. Tourist seasons (high/low)
4. Special weather phenomena
5. Best activities for that time
6. What to pack
7. Weather-related travel advisories

Give practical advice for travelers visiting {location} in {month}."
    )
}

fn best_dates_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let window = integer(args, "flexible_window_months", 6);
    format!(
        "As a travel expert, recommend the best times to visit {location} within the next {window} months.

Consider:
1. Weather conditions
2. Tourist crowds and prices
3. Local festivals and events
4. Seasonal attractions
5. Travel costs (flights, accommodation)
6. Natural phenomena (cherry blossoms, northern lights, etc.)

Rank the months from best to worst and explain each ranking."
    )
}
