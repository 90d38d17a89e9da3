//! Attractions, events and culture analyses.

use serde_json::Value;
use wayfarer_core::tool::{ArgType, ToolParam};
use crate::analysis::{AnalysisSpec, integer, list, text};

pub static FIND_ATTRACTIONS_AND_ACTIVITIES: AnalysisSpec = AnalysisSpec {
    name: "find_attractions_and_activities",
    description: "Recommend attractions, hidden gems and activities matching the traveler's interests.",
    params: &[
        ToolParam::required("location", ArgType::String, "City to explore"),
        ToolParam::required("interests", ArgType::StringList, "Traveler interests"),
        ToolParam::required("duration_days", ArgType::Integer, "Number of days"),
    ],
    output_field: "attractions_guide",
    prompt: attractions_prompt,
};

pub static FIND_LOCAL_EVENTS_AND_CULTURE: AnalysisSpec = AnalysisSpec {
    name: "find_local_events_and_culture",
    description: "List festivals, performances, markets and cultural etiquette for the travel dates.",
    params: &[
        ToolParam::required("location", ArgType::String, "City to explore"),
        ToolParam::required("dates", ArgType::StringList, "Travel dates or month"),
        ToolParam::required("interests", ArgType::StringList, "Traveler interests"),
    ],
    output_field: "events_and_culture",
    prompt: events_prompt,
};

fn attractions_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let interests = list(args, "interests");
    let days = integer(args, "duration_days", 1);
    format!(
        "As a local expert for {location}, recommend the best attractions and activities for someone interested in {interests}.

For a {days}-day trip, cover:
1. Must-see attractions per interest
2. Hidden gems and local favorites
3. Opening hours and best visiting times
4. Visit duration
5. Entry fees and booking requirements
6. Seasonal considerations
7. Photography tips
8. Nearby food and facilities
9. Accessibility
10. Avoiding crowds"
    )
}

fn events_prompt(args: &Value) -> String {
    let location = text(args, "location");
    let dates = list(args, "dates");
    let interests = list(args, "interests");
    format!(
        "As a local cultural expert for {location}, describe events and cultural activities during {dates}.

Focus on interests: {interests}

Include festivals, performances, markets and food events, exhibitions,
music and nightlife, sports, traditional celebrations, workshops, booking
costs, and cultural etiquette."
    )
}
