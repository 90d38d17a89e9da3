//! The planning session: intake, coordination and the concierge behind one
//! handle. This is what the CLI drives.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use wayfarer_config::AppConfig;
use wayfarer_core::error::ToolError;
use wayfarer_core::event::EventBus;
use wayfarer_core::provider::Provider;
use wayfarer_tools::AnalysisBackend;

use crate::agent::{AgentResult, AgentSettings};
use crate::aggregator::{AggregationError, FinalizedPlan, PlanSection, TravelPlan};
use crate::concierge::{Concierge, ConciergeNote};
use crate::coordinator::{AgentRegistry, Coordinator, PlanningOutcome};
use crate::intake::{Field, IntakeMachine, IntakeState, PromptKey, Session, TripRequest, ValidationError};

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("failed to bind specialist tools: {0}")]
    Setup(#[from] ToolError),
}

pub struct Planner {
    intake: IntakeMachine,
    coordinator: Coordinator,
    concierge: Concierge,
    events: Arc<EventBus>,
}

impl Planner {
    /// Assemble a planner over one gateway: the analysis tools, the four
    /// specialists and the concierge all share `provider`.
    pub fn new(provider: Arc<dyn Provider>, config: &AppConfig) -> Result<Self, PlannerError> {
        let settings = AgentSettings::from_config(config);
        let mut backend = AnalysisBackend::new(provider.clone(), &settings.model);
        backend.max_tokens = settings.max_tokens;
        let tools = wayfarer_tools::default_registry(backend);
        Self::with_tools(provider, &tools, settings, config.planner.concurrent_specialists)
    }

    /// Assemble a planner with an explicit tool registry.
    pub fn with_tools(
        provider: Arc<dyn Provider>,
        tools: &wayfarer_core::tool::ToolRegistry,
        settings: AgentSettings,
        concurrent: bool,
    ) -> Result<Self, PlannerError> {
        let events = Arc::new(EventBus::default());
        let agents = AgentRegistry::build(provider.clone(), tools, &settings, Some(events.clone()))?;
        Ok(Self {
            intake: IntakeMachine::new().with_events(events.clone()),
            coordinator: Coordinator::new(agents)
                .with_concurrency(concurrent)
                .with_events(events.clone()),
            concierge: Concierge::new(provider, settings),
            events,
        })
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    // --- intake ---

    pub fn submit_answer(&mut self, field: Field, value: &str) -> Result<PromptKey, ValidationError> {
        self.intake.submit_answer(field, value)
    }

    pub fn current_prompt_key(&self) -> PromptKey {
        self.intake.current_prompt_key()
    }

    pub fn is_ready(&self) -> bool {
        self.intake.is_ready()
    }

    pub fn state(&self) -> IntakeState {
        self.intake.state()
    }

    pub fn session(&self) -> &Session {
        self.intake.session()
    }

    // --- planning ---

    /// Advisory best-months answer for a flexible traveler.
    pub async fn recommend_travel_window(&mut self) -> Result<AgentResult, ValidationError> {
        let destination = self
            .intake
            .session()
            .destination()
            .ok_or(ValidationError::EmptyValue {
                field: Field::Destination,
            })?
            .to_string();
        Ok(self.coordinator.recommend_travel_window(&destination).await)
    }

    /// Run planning. On abort the machine returns to `Ready` and the plan
    /// keeps whatever it held before.
    pub async fn plan(&mut self, cancel: impl Future<Output = ()>) -> Result<PlanningOutcome, ValidationError> {
        let trip = self.intake.begin_planning()?;
        let outcome = self.coordinator.plan_trip(&trip, cancel).await;
        match outcome {
            PlanningOutcome::Completed { .. } => self.intake.complete_planning()?,
            PlanningOutcome::Aborted => self.intake.abort_planning()?,
        }
        Ok(outcome)
    }

    /// Route a follow-up question to one specialist.
    pub async fn follow_up(&mut self, utterance: &str) -> Result<&PlanSection, ValidationError> {
        let trip = self.intake.accept_follow_up()?;
        Ok(self.coordinator.refine(&trip, utterance).await)
    }

    pub fn plan_so_far(&self) -> &TravelPlan {
        self.coordinator.plan()
    }

    pub fn finalize(&self) -> Result<FinalizedPlan, AggregationError> {
        self.coordinator.finalize()
    }

    /// The trip as last handed to planning.
    pub fn trip(&self) -> Option<TripRequest> {
        self.intake.session().to_trip_request()
    }

    pub fn end(&mut self) -> Result<(), ValidationError> {
        self.intake.end()
    }

    // --- concierge ---

    /// Tips, checklist and budget estimate for the current plan.
    pub async fn extras(&self) -> Result<Extras, ValidationError> {
        let trip = self.intake.accept_follow_up()?;
        let plan = self.coordinator.plan();
        let (tips, checklist, budget) = tokio::join!(
            self.concierge.final_tips(&trip),
            self.concierge.checklist(&trip),
            self.concierge.budget_estimate(&trip, plan),
        );
        Ok(Extras {
            tips,
            checklist,
            budget,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Extras {
    pub tips: ConciergeNote,
    pub checklist: ConciergeNote,
    pub budget: ConciergeNote,
}
