//! Multi-turn intake — the conversation state machine.
//!
//! ```text
//! CollectOriginDestination → CollectDateMode ─┬─ Flexible → CollectCandidateMonth ─┐
//!                                             └─ Fixed ───────────────────────────┴→ CollectConcreteDates
//!   → CollectTripAttributes → CollectInterests → CollectBudgetAndLodging → Ready → Planning → Refinement
//! ```
//!
//! Every answer is validated before anything is written. A rejected answer
//! leaves both the session and the current state untouched.

pub mod session;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use wayfarer_core::event::{DomainEvent, EventBus};

pub use session::{
    ActivityPreference, BudgetTier, DateMode, DateRange, DateSelection, Season, Session,
    TripRequest, month_name, parse_month,
};

/// Where the conversation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeState {
    CollectOriginDestination,
    CollectDateMode,
    CollectCandidateMonth,
    CollectConcreteDates,
    CollectTripAttributes,
    CollectInterests,
    CollectBudgetAndLodging,
    Ready,
    Planning,
    Refinement,
    Ended,
}

impl IntakeState {
    /// Fields answered in this state, in prompt order.
    fn fields(self) -> &'static [Field] {
        match self {
            Self::CollectOriginDestination => &[Field::Origin, Field::Destination],
            Self::CollectDateMode => &[Field::DateMode],
            Self::CollectCandidateMonth => &[Field::CandidateMonth],
            Self::CollectConcreteDates => &[Field::ConcreteDates],
            Self::CollectTripAttributes => &[Field::DurationDays, Field::ActivityPreference],
            Self::CollectInterests => &[Field::Interests],
            Self::CollectBudgetAndLodging => &[Field::BudgetTier, Field::LodgingType],
            Self::Ready | Self::Planning | Self::Refinement | Self::Ended => &[],
        }
    }

    fn is_collecting(self) -> bool {
        !self.fields().is_empty()
    }
}

impl fmt::Display for IntakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A session field the traveler can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Origin,
    Destination,
    DateMode,
    CandidateMonth,
    ConcreteDates,
    DurationDays,
    ActivityPreference,
    Interests,
    BudgetTier,
    LodgingType,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::DateMode => "date_mode",
            Self::CandidateMonth => "candidate_month",
            Self::ConcreteDates => "concrete_dates",
            Self::DurationDays => "duration_days",
            Self::ActivityPreference => "activity_preference",
            Self::Interests => "interests",
            Self::BudgetTier => "budget_tier",
            Self::LodgingType => "lodging_type",
        })
    }
}

/// What the shell should ask next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKey {
    /// Answer for a specific field
    Ask(Field),
    /// All preferences collected; planning may start
    ConfirmPlanning,
    /// Agents are working
    Planning,
    /// Plan delivered; free-form follow-ups accepted
    FollowUp,
    /// Conversation over
    Done,
}

/// A rejected answer or an operation attempted in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyValue { field: Field },

    #[error("'{value}' is not a valid {field} (expected one of: {expected})")]
    InvalidChoice {
        field: Field,
        value: String,
        expected: &'static str,
    },

    #[error("{field} must be a positive whole number, got '{value}'")]
    NotPositive { field: Field, value: String },

    #[error("'{value}' is not a valid date range (expected YYYY-MM-DD, YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("trip ends ({end}) before it starts ({start})")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("{field} is not asked in state {state}")]
    UnexpectedField { field: Field, state: IntakeState },

    #[error("operation not allowed in state {state}")]
    WrongPhase { state: IntakeState },

    #[error("{field} cannot be changed once planning has started")]
    FieldLocked { field: Field },
}

/// A validated value, ready to be written.
enum Answer {
    Text(String),
    DateMode(DateMode),
    Month(String),
    Dates(DateRange),
    Duration(u32),
    Activity(ActivityPreference),
    Interests(BTreeSet<String>),
    Budget(BudgetTier),
}

/// Drives intake and owns the only writable handle to the [`Session`].
pub struct IntakeMachine {
    state: IntakeState,
    session: Session,
    events: Option<Arc<EventBus>>,
}

impl Default for IntakeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeMachine {
    pub fn new() -> Self {
        Self {
            state: IntakeState::CollectOriginDestination,
            session: Session::default(),
            events: None,
        }
    }

    /// Publish `IntakeAdvanced` on every transition.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> IntakeState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_ready(&self) -> bool {
        self.state == IntakeState::Ready
    }

    /// The question to ask in the current state.
    pub fn current_prompt_key(&self) -> PromptKey {
        match self.state {
            IntakeState::Ready => PromptKey::ConfirmPlanning,
            IntakeState::Planning => PromptKey::Planning,
            IntakeState::Refinement => PromptKey::FollowUp,
            IntakeState::Ended => PromptKey::Done,
            state => state
                .fields()
                .iter()
                .find(|f| !self.is_answered(**f))
                .or(state.fields().first())
                .map(|f| PromptKey::Ask(*f))
                .unwrap_or(PromptKey::Done),
        }
    }

    /// Validate and record one answer.
    ///
    /// During intake only the current state's fields are accepted. In `Ready`
    /// and `Refinement` any previously collected field may be corrected,
    /// except the date mode, which fixes the branch already taken.
    pub fn submit_answer(&mut self, field: Field, value: &str) -> Result<PromptKey, ValidationError> {
        match self.state {
            state if state.is_collecting() => {
                if !state.fields().contains(&field) {
                    return Err(ValidationError::UnexpectedField { field, state });
                }
            }
            IntakeState::Ready | IntakeState::Refinement => {
                if field == Field::DateMode {
                    return Err(ValidationError::FieldLocked { field });
                }
                if field == Field::CandidateMonth && self.session.date_mode() != Some(DateMode::Flexible) {
                    return Err(ValidationError::UnexpectedField { field, state: self.state });
                }
            }
            state => return Err(ValidationError::WrongPhase { state }),
        }

        let answer = Self::validate(field, value)?;
        self.apply(answer, field);
        debug!(%field, state = %self.state, "Answer accepted");

        if self.state.is_collecting() {
            self.advance();
        }
        Ok(self.current_prompt_key())
    }

    /// Hand the session over for planning: `Ready`/`Refinement` → `Planning`.
    pub fn begin_planning(&mut self) -> Result<TripRequest, ValidationError> {
        if !matches!(self.state, IntakeState::Ready | IntakeState::Refinement) {
            return Err(ValidationError::WrongPhase { state: self.state });
        }
        let trip = self
            .session
            .to_trip_request()
            .ok_or(ValidationError::WrongPhase { state: self.state })?;
        self.transition(IntakeState::Planning);
        Ok(trip)
    }

    /// First aggregated result delivered: `Planning` → `Refinement`.
    pub fn complete_planning(&mut self) -> Result<(), ValidationError> {
        self.require(IntakeState::Planning)?;
        self.transition(IntakeState::Refinement);
        Ok(())
    }

    /// Traveler cancelled planning: `Planning` → `Ready`.
    pub fn abort_planning(&mut self) -> Result<(), ValidationError> {
        self.require(IntakeState::Planning)?;
        self.transition(IntakeState::Ready);
        Ok(())
    }

    /// Accept a free-form follow-up. Only valid in `Refinement`.
    pub fn accept_follow_up(&self) -> Result<TripRequest, ValidationError> {
        self.require(IntakeState::Refinement)?;
        self.session
            .to_trip_request()
            .ok_or(ValidationError::WrongPhase { state: self.state })
    }

    /// Explicit exit from `Refinement`.
    pub fn end(&mut self) -> Result<(), ValidationError> {
        self.require(IntakeState::Refinement)?;
        self.transition(IntakeState::Ended);
        Ok(())
    }

    fn require(&self, expected: IntakeState) -> Result<(), ValidationError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ValidationError::WrongPhase { state: self.state })
        }
    }

    fn is_answered(&self, field: Field) -> bool {
        let s = &self.session;
        match field {
            Field::Origin => s.origin().is_some(),
            Field::Destination => s.destination().is_some(),
            Field::DateMode => s.date_mode().is_some(),
            Field::CandidateMonth => s.candidate_month().is_some(),
            Field::ConcreteDates => s.concrete_dates().is_some(),
            Field::DurationDays => s.duration_days().is_some(),
            Field::ActivityPreference => s.activity_preference().is_some(),
            Field::Interests => !s.interests().is_empty(),
            Field::BudgetTier => s.budget_tier().is_some(),
            Field::LodgingType => s.lodging_type().is_some(),
        }
    }

    /// Move past every state whose fields are all answered.
    fn advance(&mut self) {
        while self.state.is_collecting() && self.state.fields().iter().all(|f| self.is_answered(*f)) {
            let next = match self.state {
                IntakeState::CollectOriginDestination => IntakeState::CollectDateMode,
                IntakeState::CollectDateMode => match self.session.date_mode() {
                    Some(DateMode::Flexible) => IntakeState::CollectCandidateMonth,
                    _ => IntakeState::CollectConcreteDates,
                },
                IntakeState::CollectCandidateMonth => IntakeState::CollectConcreteDates,
                IntakeState::CollectConcreteDates => IntakeState::CollectTripAttributes,
                IntakeState::CollectTripAttributes => IntakeState::CollectInterests,
                IntakeState::CollectInterests => IntakeState::CollectBudgetAndLodging,
                _ => IntakeState::Ready,
            };
            self.transition(next);
        }
    }

    fn transition(&mut self, to: IntakeState) {
        let from = self.state;
        self.state = to;
        debug!(%from, %to, "Intake transition");
        if let Some(events) = &self.events {
            events.publish(DomainEvent::IntakeAdvanced {
                from: from.to_string(),
                to: to.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    fn apply(&mut self, answer: Answer, field: Field) {
        let s = &mut self.session;
        match answer {
            Answer::Text(v) => match field {
                Field::Origin => s.set_origin(v),
                Field::Destination => s.set_destination(v),
                _ => s.set_lodging_type(v),
            },
            Answer::DateMode(mode) => s.set_date_mode(mode),
            Answer::Month(m) => s.set_candidate_month(m),
            Answer::Dates(range) => s.set_concrete_dates(range),
            Answer::Duration(days) => s.set_duration_days(days),
            Answer::Activity(pref) => s.set_activity_preference(pref),
            Answer::Interests(set) => s.set_interests(set),
            Answer::Budget(tier) => s.set_budget_tier(tier),
        }
    }

    fn validate(field: Field, raw: &str) -> Result<Answer, ValidationError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(ValidationError::EmptyValue { field });
        }

        let invalid = |expected: &'static str| ValidationError::InvalidChoice {
            field,
            value: value.to_string(),
            expected,
        };

        match field {
            Field::Origin | Field::Destination | Field::LodgingType => Ok(Answer::Text(value.to_string())),
            Field::DateMode => DateMode::parse(value)
                .map(Answer::DateMode)
                .ok_or_else(|| invalid("flexible, fixed")),
            Field::CandidateMonth => parse_month(value)
                .map(|m| Answer::Month(month_name(m).to_string()))
                .ok_or_else(|| invalid("a month name such as April")),
            Field::ConcreteDates => parse_date_range(value).map(Answer::Dates),
            Field::DurationDays => value
                .parse::<u32>()
                .ok()
                .filter(|d| *d > 0)
                .map(Answer::Duration)
                .ok_or_else(|| ValidationError::NotPositive {
                    field,
                    value: value.to_string(),
                }),
            Field::ActivityPreference => ActivityPreference::parse(value)
                .map(Answer::Activity)
                .ok_or_else(|| invalid("day, night, mixed")),
            Field::Interests => {
                let interests: BTreeSet<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if interests.is_empty() {
                    return Err(ValidationError::EmptyValue { field });
                }
                Ok(Answer::Interests(interests))
            }
            Field::BudgetTier => BudgetTier::parse(value)
                .map(Answer::Budget)
                .ok_or_else(|| invalid("low, medium, high")),
        }
    }
}

/// Parse "YYYY-MM-DD, YYYY-MM-DD" (or "... to ...") into a range.
fn parse_date_range(value: &str) -> Result<DateRange, ValidationError> {
    let invalid = || ValidationError::InvalidDate { value: value.to_string() };

    let normalized = value.replace(" to ", ",");
    let parts: Vec<&str> = normalized
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let [start, end] = parts.as_slice() else {
        return Err(invalid());
    };

    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").map_err(|_| invalid())?;
    let end = NaiveDate::parse_from_str(end, "%Y-%m-%d").map_err(|_| invalid())?;
    DateRange::new(start, end).ok_or(ValidationError::DateOrder { start, end })
}
