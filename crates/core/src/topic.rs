//! Topic keys — the closed set of travel concerns.
//!
//! Every specialist agent and every plan section is keyed by a [`Topic`].
//! The enum is the routing vocabulary: a mapping "topic → agent" over it is
//! total by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A travel concern handled by exactly one specialist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    /// Weather and seasonality
    Weather,
    /// Flights and lodging
    Booking,
    /// Local transport and day-by-day routes
    Routing,
    /// Attractions, events and culture
    Attractions,
}

impl Topic {
    /// All topics, in planning order. This order is also the tie-break
    /// precedence used by the refinement router.
    pub const ALL: [Topic; 4] = [Topic::Weather, Topic::Booking, Topic::Routing, Topic::Attractions];

    /// Stable lowercase key.
    pub fn key(self) -> &'static str {
        match self {
            Topic::Weather => "weather",
            Topic::Booking => "booking",
            Topic::Routing => "routing",
            Topic::Attractions => "attractions",
        }
    }

    /// Section heading used in rendered plans.
    pub fn title(self) -> &'static str {
        match self {
            Topic::Weather => "Weather & Seasons",
            Topic::Booking => "Flights & Accommodation",
            Topic::Routing => "Transport & Itinerary",
            Topic::Attractions => "Attractions & Culture",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
