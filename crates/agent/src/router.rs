//! Refinement-phase routing of free-form follow-ups to a topic.
//!
//! Scoring is the number of distinct keywords of a topic that appear as
//! whole words in the utterance. The highest score wins. On a tie the most
//! recently active specialist wins if it is among the tied topics, otherwise
//! the fixed precedence of [`Topic::ALL`] (Weather, Booking, Routing,
//! Attractions) decides. With no hits at all, the follow-up goes to the most
//! recently active specialist, or Weather when none has run.

use std::collections::BTreeSet;
use tracing::debug;
use wayfarer_core::topic::Topic;

fn keywords(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Weather => &[
            "weather", "climate", "season", "seasons", "seasonal", "rain", "rainy", "temperature",
            "forecast", "month", "months", "humid", "humidity", "pack", "packing", "when",
        ],
        Topic::Booking => &[
            "flight", "flights", "fly", "airline", "airlines", "airport", "fare", "fares", "price",
            "prices", "hotel", "hotels", "accommodation", "stay", "room", "rooms", "hostel",
            "apartment", "lodging", "booking", "book",
        ],
        Topic::Routing => &[
            "transport", "transportation", "route", "routes", "itinerary", "schedule", "metro",
            "subway", "bus", "train", "trains", "taxi", "traffic", "biking", "bike", "cycling",
            "walking", "commute", "getting",
        ],
        Topic::Attractions => &[
            "attraction", "attractions", "activity", "activities", "event", "events", "culture",
            "cultural", "museum", "museums", "temple", "temples", "festival", "festivals", "food",
            "nightlife", "art", "sightseeing", "tour", "tours", "shopping",
        ],
    }
}

/// Keyword classifier with a memory of the last routed topic.
#[derive(Debug, Clone, Default)]
pub struct TopicRouter {
    last_active: Option<Topic>,
}

impl TopicRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_active(&self) -> Option<Topic> {
        self.last_active
    }

    /// Record that `topic`'s specialist has just run.
    pub fn mark_active(&mut self, topic: Topic) {
        self.last_active = Some(topic);
    }

    /// Per-topic scores for `utterance`, in precedence order.
    pub fn scores(utterance: &str) -> [(Topic, usize); 4] {
        let words: BTreeSet<String> = utterance
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        Topic::ALL.map(|topic| {
            let hits = keywords(topic).iter().filter(|k| words.contains(**k)).count();
            (topic, hits)
        })
    }

    /// Pick the topic for a follow-up. Pure: does not update `last_active`.
    pub fn classify(&self, utterance: &str) -> Topic {
        let scores = Self::scores(utterance);
        let top = scores.iter().map(|(_, hits)| *hits).max().unwrap_or(0);

        let topic = if top == 0 {
            self.last_active.unwrap_or(Topic::Weather)
        } else {
            let mut tied = scores.iter().filter(|(_, hits)| *hits == top).map(|(topic, _)| *topic);
            match self.last_active {
                Some(active) if tied.clone().any(|t| t == active) => active,
                // scores follow Topic::ALL order, so the first tied topic has precedence
                _ => tied.next().unwrap_or(Topic::Weather),
            }
        };
        debug!(?scores, routed = ?topic, "Classified follow-up");
        topic
    }
}
