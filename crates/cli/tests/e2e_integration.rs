//! End-to-end integration tests for the Wayfarer planner.
//!
//! These tests drive a full session through the public API: intake answers,
//! the planning fan-out with real analysis tools, follow-up routing and the
//! final plan snapshot. The model gateway is scripted per specialist.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use wayfarer_agent::{
    AgentSettings, DegradationKind, Field, IntakeState, Planner, PlanningOutcome, PromptKey, TopicRouter,
    prompts,
};
use wayfarer_core::error::ProviderError;
use wayfarer_core::message::{Message, MessageToolCall, Role};
use wayfarer_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use wayfarer_core::Topic;
use wayfarer_tools::{AnalysisBackend, default_registry};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A gateway with one scripted queue per specialist.
///
/// Specialist requests are recognised by their system prompt. Requests
/// without one come from analysis tools or the concierge and always get
/// `analysis`. Topics listed in `stalled` never answer.
struct ScriptedProvider {
    scripts: Mutex<HashMap<Topic, VecDeque<ProviderResponse>>>,
    requests: Mutex<HashMap<Topic, Vec<ProviderRequest>>>,
    stalled: Vec<Topic>,
    analysis: String,
}

impl ScriptedProvider {
    fn new(scripts: impl IntoIterator<Item = (Topic, Vec<ProviderResponse>)>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().map(|(t, r)| (t, r.into())).collect()),
            requests: Mutex::new(HashMap::new()),
            stalled: Vec::new(),
            analysis: "Cherry blossoms peak in early April.".into(),
        }
    }

    fn stalling(mut self, topic: Topic) -> Self {
        self.stalled.push(topic);
        self
    }

    fn requests_for(&self, topic: Topic) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().get(&topic).cloned().unwrap_or_default()
    }
}

fn topic_of(request: &ProviderRequest) -> Option<Topic> {
    let system = request.messages.iter().find(|m| m.role == Role::System)?;
    Topic::ALL
        .into_iter()
        .find(|t| system.content.starts_with(prompts::system_prompt(*t)))
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let Some(topic) = topic_of(&request) else {
            return Ok(text_response(&self.analysis));
        };
        if self.stalled.contains(&topic) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            return Err(ProviderError::Timeout("stalled".into()));
        }

        self.requests.lock().unwrap().entry(topic).or_default().push(request);
        let next = self.scripts.lock().unwrap().get_mut(&topic).and_then(VecDeque::pop_front);
        next.ok_or_else(|| ProviderError::ApiError {
            status_code: 500,
            message: format!("no scripted response left for {topic}"),
        })
    }
}

fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 50,
            completion_tokens: 20,
            total_tokens: 70,
        }),
        model: "e2e-model".into(),
    }
}

fn tool_response(name: &str, arguments: serde_json::Value) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = vec![MessageToolCall {
        id: format!("call_{name}"),
        name: name.into(),
        arguments: arguments.to_string(),
    }];
    ProviderResponse {
        message,
        usage: None,
        model: "e2e-model".into(),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn settings() -> AgentSettings {
    AgentSettings {
        model: "e2e-model".into(),
        gateway_timeout: Duration::from_secs(5),
        ..AgentSettings::default()
    }
}

fn planner(provider: Arc<ScriptedProvider>) -> Planner {
    let tools = default_registry(AnalysisBackend::new(provider.clone(), "e2e-model"));
    Planner::with_tools(provider, &tools, settings(), true).unwrap()
}

/// Answer every question for a fixed-date Tokyo trip.
fn fill_fixed(planner: &mut Planner) {
    let answers = [
        (Field::Origin, "New York"),
        (Field::Destination, "Tokyo"),
        (Field::DateMode, "fixed"),
        (Field::ConcreteDates, "2025-04-05, 2025-04-12"),
        (Field::DurationDays, "7"),
        (Field::ActivityPreference, "day"),
        (Field::Interests, "food, temples, hiking"),
        (Field::BudgetTier, "high"),
        (Field::LodgingType, "ryokan"),
    ];
    for (field, value) in answers {
        planner.submit_answer(field, value).unwrap();
    }
    assert!(planner.is_ready());
}

fn plain_scripts() -> Vec<(Topic, Vec<ProviderResponse>)> {
    vec![
        (Topic::Weather, vec![text_response("Mild spring days, around 15°C.")]),
        (Topic::Booking, vec![text_response("JFK to HND nonstop, about 14 hours.")]),
        (Topic::Routing, vec![text_response("Get a Suica card; the JR loop covers most sights.")]),
        (Topic::Attractions, vec![text_response("Senso-ji at dawn, Tsukiji outer market.")]),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_flexible_intake_then_full_plan() {
    let provider = Arc::new(ScriptedProvider::new([
        (
            Topic::Weather,
            vec![
                // Travel window advice during intake
                text_response("April and November are the best months."),
                // Planning: one tool round, then the answer
                tool_response(
                    "analyze_weather_and_seasons",
                    json!({"location": "Tokyo", "travel_month": "April"}),
                ),
                text_response("Expect cherry blossoms and light rain."),
            ],
        ),
        (Topic::Booking, vec![text_response("Fly JFK to HND.")]),
        (Topic::Routing, vec![text_response("Use the Yamanote line.")]),
        (Topic::Attractions, vec![text_response("Visit Meiji Shrine.")]),
    ]));
    let mut planner = planner(provider.clone());

    assert_eq!(planner.current_prompt_key(), PromptKey::Ask(Field::Origin));
    planner.submit_answer(Field::Origin, "New York").unwrap();
    planner.submit_answer(Field::Destination, "Tokyo").unwrap();
    let next = planner.submit_answer(Field::DateMode, "flexible").unwrap();
    assert_eq!(next, PromptKey::Ask(Field::CandidateMonth));

    let advice = planner.recommend_travel_window().await.unwrap();
    assert_eq!(advice.narrative, "April and November are the best months.");
    assert!(planner.plan_so_far().is_empty(), "advice is never merged");

    for (field, value) in [
        (Field::CandidateMonth, "April"),
        (Field::ConcreteDates, "2024-04-10 to 2024-04-17"),
        (Field::DurationDays, "7"),
        (Field::ActivityPreference, "mixed"),
        (Field::Interests, "art, food, traditional culture, temples"),
        (Field::BudgetTier, "medium"),
        (Field::LodgingType, "hotel"),
    ] {
        planner.submit_answer(field, value).unwrap();
    }
    assert_eq!(planner.state(), IntakeState::Ready);
    let trip = planner.trip().unwrap();
    assert_eq!(trip.candidate_month.as_deref(), Some("April"));
    assert_eq!(trip.interests.len(), 4);
    assert!(trip.interests.contains("traditional culture"));

    let outcome = planner.plan(std::future::pending()).await.unwrap();
    assert_eq!(outcome, PlanningOutcome::Completed { degraded: vec![] });
    assert_eq!(planner.state(), IntakeState::Refinement);

    let plan = planner.plan_so_far();
    assert_eq!(plan.len(), 4);
    let weather = plan.section(Topic::Weather).unwrap();
    assert_eq!(weather.narrative, "Expect cherry blossoms and light rain.");
    assert_eq!(weather.tool_calls.len(), 1);
    assert_eq!(
        weather.payload.as_ref().unwrap()["analyze_weather_and_seasons"]["analysis"],
        "Cherry blossoms peak in early April."
    );

    // The other specialists see the weather notes in their context
    let booking_request = &provider.requests_for(Topic::Booking)[0];
    let context = &booking_request.messages.last().unwrap().content;
    assert!(context.contains("Tokyo"));
    assert!(context.contains("Expect cherry blossoms"));
}

#[tokio::test(start_paused = true)]
async fn e2e_stalled_specialist_degrades_only_its_section() {
    let provider = Arc::new(ScriptedProvider::new(plain_scripts()).stalling(Topic::Booking));
    let mut planner = planner(provider);
    fill_fixed(&mut planner);

    let outcome = planner.plan(std::future::pending()).await.unwrap();
    assert_eq!(
        outcome,
        PlanningOutcome::Completed {
            degraded: vec![Topic::Booking]
        }
    );

    let plan = planner.plan_so_far();
    assert_eq!(plan.len(), 4);
    let booking = plan.section(Topic::Booking).unwrap();
    assert_eq!(booking.degraded.as_ref().unwrap().kind, DegradationKind::Timeout);
    assert!(booking.payload.is_none());
    assert!(plan.section(Topic::Routing).unwrap().degraded.is_none());
    assert_eq!(plan.degraded_topics(), vec![Topic::Booking]);

    // A degraded plan is still a complete plan
    assert!(planner.finalize().is_ok());
}

#[tokio::test]
async fn e2e_follow_ups_route_deterministically() {
    let mut scripts = plain_scripts();
    scripts[1].1.push(text_response("Ryokan near Ueno park, close to the museums."));
    scripts[1].1.push(text_response("Check-in is from 3pm."));
    scripts[2].1.push(text_response("Rent bikes along the Sumida river."));
    scripts[3].1.push(text_response("The Ghibli Museum sells tickets a month ahead."));
    scripts[3].1.push(text_response("Ueno park hosts three national museums."));
    let provider = Arc::new(ScriptedProvider::new(scripts));
    let mut planner = planner(provider.clone());
    fill_fixed(&mut planner);
    planner.plan(std::future::pending()).await.unwrap();

    // No keywords straight after planning: Attractions ran last
    let section = planner.follow_up("tell me more").await.unwrap();
    assert_eq!(section.topic, Topic::Attractions);
    assert_eq!(section.revision, 2);
    assert_eq!(provider.requests_for(Topic::Weather).len(), 1);

    // Booking and Attractions tie; Attractions is the active specialist
    let section = planner.follow_up("a hotel near the museum").await.unwrap();
    assert_eq!(section.topic, Topic::Attractions);
    assert_eq!(section.revision, 3);

    // Routing 2 hits beats Weather 1
    assert_eq!(TopicRouter::new().classify("what about the weather for biking routes"), Topic::Routing);
    let section = planner.follow_up("what about the weather for biking routes").await.unwrap();
    assert_eq!(section.topic, Topic::Routing);
    assert_eq!(section.revision, 2);

    // Same tie, but Routing is active and not part of it; Booking comes first
    let section = planner.follow_up("a hotel near the museum").await.unwrap();
    assert_eq!(section.topic, Topic::Booking);
    assert_eq!(section.narrative, "Ryokan near Ueno park, close to the museums.");

    // No keywords: stays with the last specialist
    let section = planner.follow_up("and after that?").await.unwrap();
    assert_eq!(section.topic, Topic::Booking);
    assert_eq!(section.revision, 3);

    let finalized = planner.finalize().unwrap();
    assert_eq!(finalized.plan.len(), 4);
    assert_eq!(
        finalized.plan.section(Topic::Booking).unwrap().narrative,
        "Check-in is from 3pm."
    );
}

#[tokio::test]
async fn e2e_identical_follow_up_answer_keeps_revision() {
    let mut scripts = plain_scripts();
    scripts[3].1.push(text_response("Senso-ji at dawn, Tsukiji outer market."));
    let provider = Arc::new(ScriptedProvider::new(scripts));
    let mut planner = planner(provider);
    fill_fixed(&mut planner);
    planner.plan(std::future::pending()).await.unwrap();

    let before = planner.plan_so_far().clone();
    let section = planner.follow_up("any food tours?").await.unwrap();
    assert_eq!(section.topic, Topic::Attractions);
    assert_eq!(section.revision, 1);
    assert_eq!(planner.plan_so_far(), &before);
}

#[tokio::test(start_paused = true)]
async fn e2e_cancelled_planning_can_restart() {
    let provider = Arc::new(ScriptedProvider::new(plain_scripts()).stalling(Topic::Weather));
    let mut planner = planner(provider);
    fill_fixed(&mut planner);

    let outcome = planner
        .plan(tokio::time::sleep(Duration::from_millis(100)))
        .await
        .unwrap();
    assert_eq!(outcome, PlanningOutcome::Aborted);
    assert_eq!(planner.state(), IntakeState::Ready);
    assert!(planner.plan_so_far().is_empty());
    assert!(planner.finalize().is_err());
    assert!(planner.follow_up("flights?").await.is_err());

    // Answers survive the abort and can still be edited
    planner.submit_answer(Field::BudgetTier, "low").unwrap();
    assert_eq!(planner.session().budget_tier().map(|b| b.as_str()), Some("low"));
}

#[tokio::test]
async fn e2e_unknown_tool_is_reported_not_fatal() {
    let mut scripts = plain_scripts();
    scripts[2].1 = vec![tool_response("book_taxi", json!({"to": "Shibuya"}))];
    let provider = Arc::new(ScriptedProvider::new(scripts));
    let mut planner = planner(provider);
    fill_fixed(&mut planner);

    let outcome = planner.plan(std::future::pending()).await.unwrap();
    assert_eq!(
        outcome,
        PlanningOutcome::Completed {
            degraded: vec![Topic::Routing]
        }
    );
    let routing = planner.plan_so_far().section(Topic::Routing).unwrap();
    assert_eq!(routing.degraded.as_ref().unwrap().kind, DegradationKind::Dispatch);
}

#[tokio::test]
async fn e2e_extras_and_end() {
    let provider = Arc::new(ScriptedProvider::new(plain_scripts()));
    let mut planner = planner(provider);
    fill_fixed(&mut planner);
    planner.plan(std::future::pending()).await.unwrap();

    let extras = planner.extras().await.unwrap();
    assert!(!extras.tips.fallback);
    assert_eq!(extras.checklist.text, "Cherry blossoms peak in early April.");

    planner.end().unwrap();
    assert_eq!(planner.current_prompt_key(), PromptKey::Done);
    assert!(planner.submit_answer(Field::BudgetTier, "low").is_err());
}
