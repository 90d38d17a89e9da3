//! Concierge extras: final tips, a packing checklist and a budget estimate.
//!
//! Each is a single gateway call outside any specialist's history. A failed
//! or timed-out call yields a static fallback note instead of an error.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use wayfarer_core::message::Message;
use wayfarer_core::provider::{Provider, ProviderRequest};

use crate::agent::AgentSettings;
use crate::aggregator::TravelPlan;
use crate::intake::TripRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConciergeNote {
    pub text: String,
    /// True when the gateway call failed and `text` is the static fallback
    pub fallback: bool,
}

const TIPS_FALLBACK: &str = "\
- Download offline maps and translation apps
- Check visa requirements and passport validity
- Notify your bank of your travel dates
- Get travel insurance
- Research local customs and etiquette";

const CHECKLIST_FALLBACK: &str = "\
- Passport, visa and printed bookings
- Clothing for the season and comfortable walking shoes
- Medication, prescriptions and a small first-aid kit
- Phone charger, power adapter and offline maps
- Payment cards plus some local cash
- Emergency contacts and insurance details";

const BUDGET_FALLBACK: &str = "A budget estimate is unavailable right now. Add up the flight and \
accommodation figures from the plan, then allow for daily food, local transport and activities.";

pub struct Concierge {
    provider: Arc<dyn Provider>,
    settings: AgentSettings,
}

impl Concierge {
    pub fn new(provider: Arc<dyn Provider>, settings: AgentSettings) -> Self {
        Self { provider, settings }
    }

    pub async fn final_tips(&self, trip: &TripRequest) -> ConciergeNote {
        let prompt = format!(
            "As a travel expert, provide final travel tips for someone visiting {destination} from \
             {origin} with interests in {interests} on a {budget} budget. Include practical advice \
             about money, safety, communication, and cultural considerations.",
            destination = trip.destination,
            origin = trip.origin,
            interests = trip.interest_list().join(", "),
            budget = trip.budget_tier.as_str(),
        );
        self.ask("final_tips", prompt, TIPS_FALLBACK).await
    }

    pub async fn checklist(&self, trip: &TripRequest) -> ConciergeNote {
        let prompt = format!(
            "Create a comprehensive travel checklist for a {days}-day trip to {destination} during \
             {season}.\n\nInclude:\n\
             1. Documents needed (passport, visa, etc.)\n\
             2. Packing essentials for the season\n\
             3. Health and safety preparations\n\
             4. Technology and communication needs\n\
             5. Money and banking considerations\n\
             6. Pre-travel preparations\n\
             7. Emergency contacts and backup plans\n\n\
             Make it practical and actionable.",
            days = trip.duration_days,
            destination = trip.destination,
            season = trip.season(),
        );
        self.ask("checklist", prompt, CHECKLIST_FALLBACK).await
    }

    /// Estimate the total cost, grounded on the plan's non-degraded sections.
    pub async fn budget_estimate(&self, trip: &TripRequest, plan: &TravelPlan) -> ConciergeNote {
        let findings: String = plan
            .sections()
            .filter(|s| s.degraded.is_none())
            .map(|s| format!("\n## {}\n{}\n", s.title, s.narrative))
            .collect();
        let prompt = format!(
            "As a travel budget expert, estimate the total cost for this trip:\n\n\
             - Route: {origin} to {destination}\n\
             - Duration: {days} days\n\
             - Budget range: {budget}\n\
             - Accommodation: {lodging}\n\
             - Interests: {interests}\n\n\
             Provide flight, accommodation (per night and total), daily food, activities, local \
             transport and miscellaneous costs, a total range, and money-saving tips. Give realistic \
             price ranges in USD.\n\nExpert findings so far:{findings}",
            origin = trip.origin,
            destination = trip.destination,
            days = trip.duration_days,
            budget = trip.budget_tier.as_str(),
            lodging = trip.lodging_type,
            interests = trip.interest_list().join(", "),
        );
        self.ask("budget_estimate", prompt, BUDGET_FALLBACK).await
    }

    async fn ask(&self, what: &str, prompt: String, fallback: &str) -> ConciergeNote {
        let mut request = ProviderRequest::new(&self.settings.model, vec![Message::user(prompt)]);
        request.temperature = self.settings.temperature;
        request.max_tokens = self.settings.max_tokens;

        let reply = tokio::time::timeout(self.settings.gateway_timeout, self.provider.complete(request)).await;
        match reply {
            Ok(Ok(response)) => match response.text() {
                Some(text) => ConciergeNote {
                    text: text.to_string(),
                    fallback: false,
                },
                None => {
                    warn!(what, "Concierge reply was empty; using fallback");
                    Self::fallback(fallback)
                }
            },
            Ok(Err(e)) => {
                warn!(what, error = %e, "Concierge request failed; using fallback");
                Self::fallback(fallback)
            }
            Err(_) => {
                warn!(what, "Concierge request timed out; using fallback");
                Self::fallback(fallback)
            }
        }
    }

    fn fallback(text: &str) -> ConciergeNote {
        ConciergeNote {
            text: text.to_string(),
            fallback: true,
        }
    }
}
