//! Coordinator — sequences the specialists and feeds the aggregator.
//!
//! Planning runs Weather first; its narrative becomes a hint for Booking,
//! Routing and Attractions, which own disjoint sections and run
//! concurrently. A planning run races the caller's cancel signal: when
//! cancel wins, every in-flight result is dropped and nothing is merged.
//!
//! During refinement a follow-up goes to exactly one specialist picked by
//! the [`TopicRouter`], and its answer replaces that topic's section.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use wayfarer_core::error::ToolError;
use wayfarer_core::event::{DomainEvent, EventBus};
use wayfarer_core::provider::Provider;
use wayfarer_core::tool::ToolRegistry;
use wayfarer_core::topic::Topic;

use crate::agent::{AgentResult, AgentSettings, SpecialistAgent};
use crate::aggregator::{AggregationError, FinalizedPlan, PlanAggregator, PlanSection, TravelPlan};
use crate::intake::TripRequest;
use crate::prompts;
use crate::router::TopicRouter;

/// One specialist per topic.
pub struct AgentRegistry {
    pub weather: SpecialistAgent,
    pub booking: SpecialistAgent,
    pub routing: SpecialistAgent,
    pub attractions: SpecialistAgent,
}

impl AgentRegistry {
    /// Build every specialist over a shared gateway, binding tools from `tools`.
    pub fn build(
        provider: Arc<dyn Provider>,
        tools: &ToolRegistry,
        settings: &AgentSettings,
        events: Option<Arc<EventBus>>,
    ) -> Result<Self, ToolError> {
        let make = |topic: Topic| -> Result<SpecialistAgent, ToolError> {
            let agent = SpecialistAgent::for_topic(topic, provider.clone(), tools, settings.clone())?;
            Ok(match &events {
                Some(bus) => agent.with_events(bus.clone()),
                None => agent,
            })
        };
        Ok(Self {
            weather: make(Topic::Weather)?,
            booking: make(Topic::Booking)?,
            routing: make(Topic::Routing)?,
            attractions: make(Topic::Attractions)?,
        })
    }

    pub fn get(&self, topic: Topic) -> &SpecialistAgent {
        match topic {
            Topic::Weather => &self.weather,
            Topic::Booking => &self.booking,
            Topic::Routing => &self.routing,
            Topic::Attractions => &self.attractions,
        }
    }

    pub fn get_mut(&mut self, topic: Topic) -> &mut SpecialistAgent {
        match topic {
            Topic::Weather => &mut self.weather,
            Topic::Booking => &mut self.booking,
            Topic::Routing => &mut self.routing,
            Topic::Attractions => &mut self.attractions,
        }
    }
}

/// How a planning run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningOutcome {
    /// All four sections were merged; some may be degraded
    Completed { degraded: Vec<Topic> },
    /// Cancelled before completion; the plan is unchanged
    Aborted,
}

pub struct Coordinator {
    agents: AgentRegistry,
    router: TopicRouter,
    aggregator: PlanAggregator,
    concurrent: bool,
    event_bus: Option<Arc<EventBus>>,
}

impl Coordinator {
    pub fn new(agents: AgentRegistry) -> Self {
        Self {
            agents,
            router: TopicRouter::new(),
            aggregator: PlanAggregator::new(),
            concurrent: true,
            event_bus: None,
        }
    }

    /// Run Booking, Routing and Attractions one after another instead.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_events(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn plan(&self) -> &TravelPlan {
        self.aggregator.plan()
    }

    pub fn finalize(&self) -> Result<FinalizedPlan, AggregationError> {
        self.aggregator.finalize()
    }

    pub fn last_active(&self) -> Option<Topic> {
        self.router.last_active()
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// Run the planning phase for `trip` unless `cancel` resolves first.
    pub async fn plan_trip(&mut self, trip: &TripRequest, cancel: impl Future<Output = ()>) -> PlanningOutcome {
        info!(destination = %trip.destination, concurrent = self.concurrent, "Planning started");

        let results = tokio::select! {
            results = run_specialists(&mut self.agents, trip, self.concurrent) => Some(results),
            _ = cancel => None,
        };

        let Some(results) = results else {
            warn!("Planning aborted; discarding in-flight results");
            self.publish(DomainEvent::PlanningAborted {
                discarded_sections: Topic::ALL.len(),
                timestamp: Utc::now(),
            });
            return PlanningOutcome::Aborted;
        };

        for result in results {
            self.merge(result);
        }
        // Attractions runs last in planning order, concurrent or not
        if let Some(&last) = Topic::ALL.last() {
            self.router.mark_active(last);
        }
        let degraded = self.aggregator.plan().degraded_topics();
        info!(
            degraded = degraded.len(),
            complete = self.aggregator.is_complete(),
            "Planning completed"
        );
        PlanningOutcome::Completed { degraded }
    }

    /// Route a follow-up to one specialist and replace its section.
    pub async fn refine(&mut self, trip: &TripRequest, utterance: &str) -> &PlanSection {
        let topic = self.router.classify(utterance);
        info!(topic = ?topic, "Routing follow-up");

        let context = prompts::refinement_context(trip, utterance);
        let result = self.agents.get_mut(topic).respond(&context).await;
        self.router.mark_active(topic);
        self.merge(result)
    }

    /// Ask the Weather specialist for the best months to visit. Advisory only;
    /// nothing is merged into the plan.
    pub async fn recommend_travel_window(&mut self, destination: &str) -> AgentResult {
        self.agents
            .weather
            .respond(&prompts::best_months_context(destination))
            .await
    }

    fn merge(&mut self, result: AgentResult) -> &PlanSection {
        let section = self.aggregator.merge(result);
        if let Some(bus) = &self.event_bus {
            bus.publish(DomainEvent::SectionMerged {
                topic: section.topic,
                degraded: section.degraded.is_some(),
                revision: section.revision,
                timestamp: Utc::now(),
            });
        }
        section
    }
}

/// Weather, then the three independent specialists.
async fn run_specialists(agents: &mut AgentRegistry, trip: &TripRequest, concurrent: bool) -> Vec<AgentResult> {
    let AgentRegistry {
        weather,
        booking,
        routing,
        attractions,
    } = agents;

    let weather_result = weather
        .respond(&prompts::planning_context(Topic::Weather, trip, None))
        .await;
    let hint = (!weather_result.is_degraded()).then_some(weather_result.narrative.as_str());

    let booking_ctx = prompts::planning_context(Topic::Booking, trip, hint);
    let routing_ctx = prompts::planning_context(Topic::Routing, trip, hint);
    let attractions_ctx = prompts::planning_context(Topic::Attractions, trip, hint);

    let (booking_result, routing_result, attractions_result) = if concurrent {
        tokio::join!(
            booking.respond(&booking_ctx),
            routing.respond(&routing_ctx),
            attractions.respond(&attractions_ctx),
        )
    } else {
        (
            booking.respond(&booking_ctx).await,
            routing.respond(&routing_ctx).await,
            attractions.respond(&attractions_ctx).await,
        )
    };

    vec![weather_result, booking_result, routing_result, attractions_result]
}
