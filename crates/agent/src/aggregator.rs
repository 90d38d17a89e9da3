//! Plan Aggregator — merges specialist results into one travel plan.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;
use wayfarer_core::topic::Topic;

use crate::agent::{AgentResult, Degradation, ToolCallRecord};

/// One topic's latest contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSection {
    pub topic: Topic,
    pub title: &'static str,
    pub agent: String,
    pub narrative: String,
    pub payload: Option<Value>,
    pub degraded: Option<Degradation>,
    pub tool_calls: Vec<ToolCallRecord>,
    /// How many times this section has been written
    pub revision: u64,
}

impl PlanSection {
    fn from_result(result: AgentResult, revision: u64) -> Self {
        Self {
            topic: result.topic,
            title: result.topic.title(),
            agent: result.agent,
            narrative: result.narrative,
            payload: result.payload,
            degraded: result.degraded,
            tool_calls: result.tool_calls,
            revision,
        }
    }
}

/// Sections keyed by topic, in topic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TravelPlan {
    sections: BTreeMap<Topic, PlanSection>,
}

impl TravelPlan {
    pub fn section(&self, topic: Topic) -> Option<&PlanSection> {
        self.sections.get(&topic)
    }

    pub fn sections(&self) -> impl Iterator<Item = &PlanSection> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn missing(&self) -> Vec<Topic> {
        Topic::ALL
            .into_iter()
            .filter(|t| !self.sections.contains_key(t))
            .collect()
    }

    pub fn degraded_topics(&self) -> Vec<Topic> {
        self.sections
            .values()
            .filter(|s| s.degraded.is_some())
            .map(|s| s.topic)
            .collect()
    }
}

/// Immutable snapshot returned by [`PlanAggregator::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedPlan {
    pub plan: TravelPlan,
    /// Time of the last merge
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("plan is missing sections: {}", list(.0))]
    MissingSections(Vec<Topic>),
}

fn list(topics: &[Topic]) -> String {
    topics.iter().map(|t| t.key()).collect::<Vec<_>>().join(", ")
}

/// Builds the plan incrementally; one section per topic.
#[derive(Debug, Clone, Default)]
pub struct PlanAggregator {
    plan: TravelPlan,
    updated_at: Option<DateTime<Utc>>,
}

impl PlanAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `result` as its topic's section, replacing any previous one.
    pub fn merge(&mut self, result: AgentResult) -> &PlanSection {
        let topic = result.topic;
        let mut section = PlanSection::from_result(result, 1);
        if let Some(previous) = self.plan.section(topic) {
            // Re-merging identical content keeps the revision
            section.revision = previous.revision;
            if *previous != section {
                section.revision += 1;
            }
        }
        debug!(topic = ?topic, revision = section.revision, degraded = section.degraded.is_some(), "Merging plan section");

        self.updated_at = Some(Utc::now());
        self.plan.sections.insert(topic, section);
        &self.plan.sections[&topic]
    }

    pub fn plan(&self) -> &TravelPlan {
        &self.plan
    }

    pub fn is_complete(&self) -> bool {
        self.plan.missing().is_empty()
    }

    /// Snapshot of the plan; fails while any topic has no section.
    pub fn finalize(&self) -> Result<FinalizedPlan, AggregationError> {
        let missing = self.plan.missing();
        if !missing.is_empty() {
            return Err(AggregationError::MissingSections(missing));
        }
        Ok(FinalizedPlan {
            plan: self.plan.clone(),
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::DegradationKind;
    use serde_json::json;

    fn result(topic: Topic, narrative: &str) -> AgentResult {
        AgentResult {
            topic,
            agent: format!("{topic} expert"),
            narrative: narrative.into(),
            payload: Some(json!({"tool": {"analysis": narrative}})),
            tool_calls: vec![],
            degraded: None,
        }
    }

    #[test]
    fn merge_replaces_per_topic() {
        let mut aggregator = PlanAggregator::new();
        aggregator.merge(result(Topic::Booking, "first"));
        aggregator.merge(result(Topic::Booking, "second"));

        assert_eq!(aggregator.plan().len(), 1);
        let section = aggregator.plan().section(Topic::Booking).unwrap();
        assert_eq!(section.narrative, "second");
        assert_eq!(section.revision, 2);
    }

    #[test]
    fn merging_the_same_result_twice_is_idempotent() {
        let mut once = PlanAggregator::new();
        once.merge(result(Topic::Weather, "sunny"));

        let mut twice = PlanAggregator::new();
        twice.merge(result(Topic::Weather, "sunny"));
        twice.merge(result(Topic::Weather, "sunny"));

        assert_eq!(once.plan(), twice.plan());
        assert_eq!(twice.plan().section(Topic::Weather).unwrap().revision, 1);
    }

    #[test]
    fn finalize_requires_all_sections() {
        let mut aggregator = PlanAggregator::new();
        assert_eq!(
            aggregator.finalize(),
            Err(AggregationError::MissingSections(Topic::ALL.to_vec()))
        );

        for topic in [Topic::Weather, Topic::Booking, Topic::Routing] {
            aggregator.merge(result(topic, "ok"));
        }
        let err = aggregator.finalize().unwrap_err();
        assert_eq!(err, AggregationError::MissingSections(vec![Topic::Attractions]));
        assert_eq!(err.to_string(), "plan is missing sections: attractions");

        aggregator.merge(result(Topic::Attractions, "ok"));
        let first = aggregator.finalize().unwrap();
        let second = aggregator.finalize().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.plan.len(), 4);
    }

    #[test]
    fn degraded_results_are_accepted() {
        let mut aggregator = PlanAggregator::new();
        let mut degraded = result(Topic::Booking, "The booking expert timed out.");
        degraded.payload = None;
        degraded.degraded = Some(Degradation::new(DegradationKind::Timeout, "60s"));
        aggregator.merge(degraded);

        assert_eq!(aggregator.plan().degraded_topics(), vec![Topic::Booking]);
        assert!(aggregator.plan().section(Topic::Booking).unwrap().payload.is_none());
    }

    #[test]
    fn sections_iterate_in_topic_order() {
        let mut aggregator = PlanAggregator::new();
        for topic in [Topic::Attractions, Topic::Weather, Topic::Routing, Topic::Booking] {
            aggregator.merge(result(topic, "ok"));
        }
        let order: Vec<Topic> = aggregator.plan().sections().map(|s| s.topic).collect();
        assert_eq!(order, Topic::ALL.to_vec());
    }
}
