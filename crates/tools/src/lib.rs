//! Travel analysis tools for Wayfarer.
//!
//! Eight tools, two per specialist topic. Each one asks the model gateway
//! for an expert analysis; none of them fetch live prices or weather.

pub mod analysis;
pub mod attractions;
pub mod booking;
pub mod routing;
pub mod weather;

use std::sync::Arc;
use wayfarer_core::tool::ToolRegistry;
use wayfarer_core::topic::Topic;

pub use analysis::{AnalysisBackend, AnalysisSpec, AnalysisTool};

/// Every analysis tool, in topic order.
pub static ALL_SPECS: [&AnalysisSpec; 8] = [
    &weather::ANALYZE_WEATHER_AND_SEASONS,
    &weather::RECOMMEND_BEST_TRAVEL_DATES,
    &booking::FIND_FLIGHT_OPTIONS,
    &booking::FIND_ACCOMMODATION_OPTIONS,
    &routing::GET_TRAFFIC_AND_TRANSPORT_INSIGHTS,
    &routing::CREATE_OPTIMIZED_ROUTE,
    &attractions::FIND_ATTRACTIONS_AND_ACTIVITIES,
    &attractions::FIND_LOCAL_EVENTS_AND_CULTURE,
];

/// Names of the tools bound to a topic's specialist.
pub fn tools_for(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Weather => &["analyze_weather_and_seasons", "recommend_best_travel_dates"],
        Topic::Booking => &["find_flight_options", "find_accommodation_options"],
        Topic::Routing => &["get_traffic_and_transport_insights", "create_optimized_route"],
        Topic::Attractions => &["find_attractions_and_activities", "find_local_events_and_culture"],
    }
}

/// Create a registry holding all eight analysis tools.
pub fn default_registry(backend: AnalysisBackend) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for spec in ALL_SPECS {
        registry.register(Arc::new(AnalysisTool::new(spec, backend.clone())));
    }
    registry
}
