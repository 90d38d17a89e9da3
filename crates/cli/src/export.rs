//! Plan export to a JSON file.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use wayfarer_agent::{Extras, FinalizedPlan, TripRequest};
use wayfarer_config::ExportConfig;

#[derive(Serialize)]
struct ExportDocument<'a> {
    generated_at: String,
    trip: &'a TripRequest,
    plan: &'a FinalizedPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    extras: Option<&'a Extras>,
}

/// `travel_plan_<destination>_<YYYYmmdd_HHMM>.json`
pub fn file_name(destination: &str, at: DateTime<Local>) -> String {
    format!("travel_plan_{}_{}.json", slugify(destination), at.format("%Y%m%d_%H%M"))
}

/// Alphanumerics and `-` survive; every other run of characters becomes one `_`.
fn slugify(destination: &str) -> String {
    let slug: String = destination
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(50)
        .collect();
    if slug.is_empty() { "trip".to_string() } else { slug }
}

/// Write the plan and trip summary into the configured directory.
pub fn write(
    config: &ExportConfig,
    trip: &TripRequest,
    plan: &FinalizedPlan,
    extras: Option<&Extras>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let now = Local::now();
    let document = ExportDocument {
        generated_at: now.to_rfc3339(),
        trip,
        plan,
        extras,
    };
    let json = if config.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };

    std::fs::create_dir_all(&config.directory)?;
    let path = config.directory.join(file_name(&trip.destination, now));
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), "Travel plan exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use wayfarer_agent::intake::{ActivityPreference, BudgetTier, DateMode, DateRange};
    use wayfarer_agent::{AgentResult, PlanAggregator};
    use wayfarer_core::Topic;

    fn trip() -> TripRequest {
        TripRequest {
            origin: "Sydney".into(),
            destination: "Hong Kong".into(),
            date_mode: DateMode::Fixed,
            candidate_month: None,
            dates: DateRange::new(
                chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2025, 6, 18).unwrap(),
            )
            .unwrap(),
            duration_days: 3,
            activity_preference: ActivityPreference::Mixed,
            interests: ["beach".to_string()].into_iter().collect(),
            budget_tier: BudgetTier::Medium,
            lodging_type: "hotel".into(),
        }
    }

    #[test]
    fn writes_plan_json() {
        let mut aggregator = PlanAggregator::new();
        for topic in Topic::ALL {
            aggregator.merge(AgentResult {
                topic,
                agent: format!("{topic} expert"),
                narrative: format!("{topic} notes"),
                payload: None,
                tool_calls: vec![],
                degraded: None,
            });
        }
        let plan = aggregator.finalize().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            directory: dir.path().join("plans"),
            pretty: false,
        };

        let path = write(&config, &trip(), &plan, None).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("travel_plan_Hong_Kong_"));

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["trip"]["destination"], "Hong Kong");
        assert_eq!(json["plan"]["plan"]["sections"]["routing"]["narrative"], "routing notes");
        assert!(json.get("extras").is_none());
    }

    #[test]
    fn file_name_sanitizes_destination() {
        let at = Local.with_ymd_and_hms(2025, 6, 15, 9, 5, 0).unwrap();
        assert_eq!(file_name("Hong Kong", at), "travel_plan_Hong_Kong_20250615_0905.json");
        assert_eq!(file_name("Paris, France", at), "travel_plan_Paris_France_20250615_0905.json");
        assert_eq!(file_name("Tokyo/Kyoto", at), "travel_plan_Tokyo_Kyoto_20250615_0905.json");
        assert_eq!(file_name(r"..\Aix-en-Provence", at), "travel_plan_Aix-en-Provence_20250615_0905.json");
        assert_eq!(file_name(" / ", at), "travel_plan_trip_20250615_0905.json");
    }

    #[test]
    fn destination_with_path_separator_stays_in_directory() {
        let plan = {
            let mut aggregator = PlanAggregator::new();
            for topic in Topic::ALL {
                aggregator.merge(AgentResult {
                    topic,
                    agent: format!("{topic} expert"),
                    narrative: format!("{topic} notes"),
                    payload: None,
                    tool_calls: vec![],
                    degraded: None,
                });
            }
            aggregator.finalize().unwrap()
        };
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            directory: dir.path().to_path_buf(),
            pretty: true,
        };
        let trip = TripRequest {
            destination: "Tokyo/Kyoto".into(),
            ..trip()
        };

        let path = write(&config, &trip, &plan, None).unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("travel_plan_Tokyo_Kyoto_"));
    }
}
