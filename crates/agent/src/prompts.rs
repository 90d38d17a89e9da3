//! Prompt fragments for the specialists.

use crate::intake::TripRequest;
use wayfarer_core::topic::Topic;

/// Display name of the specialist for a topic.
pub fn agent_name(topic: Topic) -> &'static str {
    match topic {
        Topic::Weather => "Weather and Seasonal Expert",
        Topic::Booking => "Flight and Accommodation Expert",
        Topic::Routing => "Route and Transportation Expert",
        Topic::Attractions => "Local Attractions and Culture Expert",
    }
}

pub fn system_prompt(topic: Topic) -> &'static str {
    match topic {
        Topic::Weather => {
            "You are a weather and seasonal travel expert. You analyze climate patterns, seasonal \
             variations, and provide detailed weather-based travel recommendations. Use your knowledge \
             of global weather patterns, seasonal tourism, and climate data to give accurate advice."
        }
        Topic::Booking => {
            "You are a flight and accommodation booking expert. You understand airline routes, pricing \
             patterns, hotel markets, and booking strategies. Provide realistic advice about flights, \
             hotels, and accommodation based on current market knowledge."
        }
        Topic::Routing => {
            "You are a local transportation and route optimization expert. You understand public \
             transport, traffic patterns, and efficient routing. Create practical itineraries that \
             minimize travel time and maximize experiences."
        }
        Topic::Attractions => {
            "You are a local attractions and cultural activities expert. You know the best attractions, \
             hidden gems, cultural events, and local experiences. Provide insider knowledge and \
             practical tips for travelers."
        }
    }
}

/// Appended to every system prompt: how to use the declared tools.
pub const TOOL_GUIDANCE: &str = "Call one of your tools when it helps answer the request, one call at a \
time. After the tool result arrives, answer in plain prose for the traveler.";

/// One-paragraph summary of the trip shared by every specialist.
pub fn trip_brief(trip: &TripRequest) -> String {
    format!(
        "Trip: {origin} to {destination}\n\
         Dates: {dates} ({month}, {season})\n\
         Duration: {days} days\n\
         Activity preference: {activity}\n\
         Interests: {interests}\n\
         Budget: {budget}\n\
         Accommodation: {lodging}",
        origin = trip.origin,
        destination = trip.destination,
        dates = trip.dates,
        month = trip.travel_month(),
        season = trip.season(),
        days = trip.duration_days,
        activity = trip.activity_preference.as_str(),
        interests = trip.interest_list().join(", "),
        budget = trip.budget_tier.as_str(),
        lodging = trip.lodging_type,
    )
}

/// Planning-phase request for one specialist.
///
/// `weather_hint` is the Weather specialist's narrative, passed to the
/// specialists that run after it.
pub fn planning_context(topic: Topic, trip: &TripRequest, weather_hint: Option<&str>) -> String {
    let destination = &trip.destination;
    let interests = trip.interest_list().join(", ");
    let ask = match topic {
        Topic::Weather => format!(
            "Analyze the weather and seasonal conditions in {destination} for {month} and say whether \
             the travel window is a good time to visit.",
            month = trip.travel_month(),
        ),
        Topic::Booking => format!(
            "Find flight options from {origin} to {destination} for {start} and {lodging} \
             accommodation for {dates}, within a {budget} budget.",
            origin = trip.origin,
            start = trip.dates.start(),
            lodging = trip.lodging_type,
            dates = trip.dates,
            budget = trip.budget_tier.as_str(),
        ),
        Topic::Routing => format!(
            "Create an optimized {days}-day itinerary for {destination} focusing on {interests} with a \
             {activity} preference, including how to get around.",
            days = trip.duration_days,
            activity = trip.activity_preference.as_str(),
        ),
        Topic::Attractions => format!(
            "Find the best attractions, activities, local events and cultural experiences in \
             {destination} during {dates} for someone interested in {interests}.",
            dates = trip.dates,
        ),
    };

    let mut context = format!("{}\n\n{ask}", trip_brief(trip));
    if let Some(hint) = weather_hint.filter(|h| !h.trim().is_empty()) {
        context.push_str("\n\nWeather expert notes:\n");
        context.push_str(hint.trim());
    }
    context
}

/// Refinement-phase request: a free-form follow-up in the trip's frame.
pub fn refinement_context(trip: &TripRequest, utterance: &str) -> String {
    format!(
        "Regarding the trip from {} to {}: {}",
        trip.origin,
        trip.destination,
        utterance.trim()
    )
}

/// Advisory request sent to the Weather specialist when dates are flexible.
pub fn best_months_context(destination: &str) -> String {
    format!(
        "The traveler is flexible on dates. Recommend the best months to visit {destination} in the \
         next six months, with a short reason for each."
    )
}
