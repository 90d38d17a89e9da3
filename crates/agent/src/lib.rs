//! Conversation orchestration for Wayfarer.
//!
//! A planning session flows through four parts:
//!
//! 1. **Intake** ([`intake`]): a state machine collects and validates the
//!    traveler's preferences until a complete [`TripRequest`] exists
//! 2. **Specialists** ([`agent`]): four agents, one per [`Topic`], each with
//!    its own system prompt, bound tools and private history
//! 3. **Coordination** ([`coordinator`], [`router`]): Weather runs first, the
//!    other three fan out; follow-ups are routed to one specialist by keyword
//! 4. **Aggregation** ([`aggregator`]): results merge into one section per
//!    topic; `finalize()` snapshots the plan once all four are present
//!
//! [`Planner`] bundles these behind the interface the CLI drives.
//!
//! [`Topic`]: wayfarer_core::Topic

pub mod agent;
pub mod aggregator;
pub mod concierge;
pub mod coordinator;
pub mod history;
pub mod intake;
pub mod planner;
pub mod prompts;
pub mod router;

#[cfg(test)]
mod test_helpers;

pub use agent::{AgentResult, AgentSettings, Degradation, DegradationKind, SpecialistAgent, ToolCallRecord, ToolOutcome};
pub use aggregator::{AggregationError, FinalizedPlan, PlanAggregator, PlanSection, TravelPlan};
pub use concierge::{Concierge, ConciergeNote};
pub use coordinator::{AgentRegistry, Coordinator, PlanningOutcome};
pub use intake::{Field, IntakeMachine, IntakeState, PromptKey, Session, TripRequest, ValidationError};
pub use planner::{Extras, Planner, PlannerError};
pub use router::TopicRouter;
