//! The traveler's collected preferences.
//!
//! A [`Session`] is a draft: fields fill in one answer at a time and only the
//! intake machine may write them. Once every field is present the draft can be
//! frozen into a [`TripRequest`], the immutable value handed to the agents.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    Flexible,
    Fixed,
}

impl DateMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flexible" => Some(Self::Flexible),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPreference {
    Day,
    Night,
    Mixed,
}

impl ActivityPreference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "night" => Some(Self::Night),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Inclusive travel window. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// ISO dates, as passed to tools.
    pub fn to_strings(&self) -> Vec<String> {
        vec![self.start.to_string(), self.end.to_string()]
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// How the traveler is choosing dates. Concrete dates only exist inside a
/// chosen branch, so "dates without a mode" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DateSelection {
    #[default]
    Undecided,
    Flexible {
        month: Option<String>,
        dates: Option<DateRange>,
    },
    Fixed {
        dates: Option<DateRange>,
    },
}

impl DateSelection {
    pub fn mode(&self) -> Option<DateMode> {
        match self {
            Self::Undecided => None,
            Self::Flexible { .. } => Some(DateMode::Flexible),
            Self::Fixed { .. } => Some(DateMode::Fixed),
        }
    }

    pub fn candidate_month(&self) -> Option<&str> {
        match self {
            Self::Flexible { month, .. } => month.as_deref(),
            _ => None,
        }
    }

    pub fn concrete_dates(&self) -> Option<DateRange> {
        match self {
            Self::Flexible { dates, .. } | Self::Fixed { dates } => *dates,
            Self::Undecided => None,
        }
    }
}

/// One planning conversation's preferences, filled in by the intake machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    origin: Option<String>,
    destination: Option<String>,
    dates: DateSelection,
    duration_days: Option<u32>,
    activity_preference: Option<ActivityPreference>,
    interests: BTreeSet<String>,
    budget_tier: Option<BudgetTier>,
    lodging_type: Option<String>,
}

impl Session {
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn dates(&self) -> &DateSelection {
        &self.dates
    }

    pub fn date_mode(&self) -> Option<DateMode> {
        self.dates.mode()
    }

    pub fn candidate_month(&self) -> Option<&str> {
        self.dates.candidate_month()
    }

    pub fn concrete_dates(&self) -> Option<DateRange> {
        self.dates.concrete_dates()
    }

    pub fn duration_days(&self) -> Option<u32> {
        self.duration_days
    }

    pub fn activity_preference(&self) -> Option<ActivityPreference> {
        self.activity_preference
    }

    pub fn interests(&self) -> &BTreeSet<String> {
        &self.interests
    }

    pub fn budget_tier(&self) -> Option<BudgetTier> {
        self.budget_tier
    }

    pub fn lodging_type(&self) -> Option<&str> {
        self.lodging_type.as_deref()
    }

    /// Freeze the draft. `None` while any required field is missing.
    pub fn to_trip_request(&self) -> Option<TripRequest> {
        Some(TripRequest {
            origin: self.origin.clone()?,
            destination: self.destination.clone()?,
            date_mode: self.dates.mode()?,
            candidate_month: self.dates.candidate_month().map(str::to_string),
            dates: self.dates.concrete_dates()?,
            duration_days: self.duration_days?,
            activity_preference: self.activity_preference?,
            interests: (!self.interests.is_empty()).then(|| self.interests.clone())?,
            budget_tier: self.budget_tier?,
            lodging_type: self.lodging_type.clone()?,
        })
    }

    // --- writes, reachable only from the intake machine ---

    pub(super) fn set_origin(&mut self, value: String) {
        self.origin = Some(value);
    }

    pub(super) fn set_destination(&mut self, value: String) {
        self.destination = Some(value);
    }

    pub(super) fn set_date_mode(&mut self, mode: DateMode) {
        self.dates = match mode {
            DateMode::Flexible => DateSelection::Flexible { month: None, dates: None },
            DateMode::Fixed => DateSelection::Fixed { dates: None },
        };
    }

    /// Only meaningful on the flexible branch; callers check the mode first.
    pub(super) fn set_candidate_month(&mut self, value: String) {
        if let DateSelection::Flexible { month, .. } = &mut self.dates {
            *month = Some(value);
        }
    }

    pub(super) fn set_concrete_dates(&mut self, range: DateRange) {
        match &mut self.dates {
            DateSelection::Flexible { dates, .. } | DateSelection::Fixed { dates } => *dates = Some(range),
            DateSelection::Undecided => {}
        }
    }

    pub(super) fn set_duration_days(&mut self, value: u32) {
        self.duration_days = Some(value);
    }

    pub(super) fn set_activity_preference(&mut self, value: ActivityPreference) {
        self.activity_preference = Some(value);
    }

    pub(super) fn set_interests(&mut self, value: BTreeSet<String>) {
        self.interests = value;
    }

    pub(super) fn set_budget_tier(&mut self, value: BudgetTier) {
        self.budget_tier = Some(value);
    }

    pub(super) fn set_lodging_type(&mut self, value: String) {
        self.lodging_type = Some(value);
    }
}

/// A complete, validated trip: the input to planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub date_mode: DateMode,
    pub candidate_month: Option<String>,
    pub dates: DateRange,
    pub duration_days: u32,
    pub activity_preference: ActivityPreference,
    pub interests: BTreeSet<String>,
    pub budget_tier: BudgetTier,
    pub lodging_type: String,
}

impl TripRequest {
    /// Month of travel: the chosen candidate month, else the start date's month.
    fn month(&self) -> u32 {
        self.candidate_month
            .as_deref()
            .and_then(parse_month)
            .unwrap_or_else(|| self.dates.start().month())
    }

    pub fn travel_month(&self) -> String {
        month_name(self.month()).to_string()
    }

    /// Season of [`Self::travel_month`].
    pub fn season(&self) -> Season {
        Season::for_month(self.month())
    }

    pub fn interest_list(&self) -> Vec<String> {
        self.interests.iter().cloned().collect()
    }
}

/// Northern-hemisphere meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Autumn,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
        })
    }
}

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// English name of a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Parse "April", "apr" or "4" into a month number.
pub fn parse_month(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let lower = value.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.to_ascii_lowercase().starts_with(&lower))
        .map(|i| i as u32 + 1)
}
