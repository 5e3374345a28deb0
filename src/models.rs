use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Completed,
    Canceled,
    Failed,
    Running,
    Scheduled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    /// Finished calls, shown on the dashboard.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled | Self::Failed)
    }

    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Running | Self::Scheduled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Running => "running",
            Self::Scheduled => "scheduled",
            Self::Unknown => "unknown",
        }
    }
}

/// One row of the remote `metrics` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(deserialize_with = "text_or_number")]
    pub id: String,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub call_outcome: Option<String>,
    #[serde(default)]
    pub carrier_sentiment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub call_status: CallStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub call_duration: f64,
    #[serde(default, deserialize_with = "attempt_count")]
    pub negotiation_attempts: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub load_loadboard_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub carrier_initial_offer: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub load_agreed_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rate_difference: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub negotiation_performance: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Numeric columns may hold `2.0` or a stray negative; counts round and clamp.
fn attempt_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Records from one fetch, split by status.
#[derive(Debug, Clone, Default)]
pub struct MetricSets {
    pub completed: Vec<MetricRecord>,
    pub running: Vec<MetricRecord>,
}

/// Date-range selector from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateRange {
    All,
    LastDays { days: u32 },
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Kpis {
    pub total_calls: usize,
    pub completed_calls: usize,
    pub success_rate: f64,
    pub avg_call_duration_secs: i64,
    pub avg_negotiation_attempts: f64,
    pub total_savings: i64,
    pub avg_savings: i64,
    pub avg_rate_difference: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptSavings {
    pub attempts: u32,
    pub label: String,
    pub avg_savings: i64,
    pub total_savings: i64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatePoint {
    pub label: String,
    pub loadboard_rate: f64,
    pub carrier_offer: f64,
    pub agreed_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPoint {
    pub date: String,
    pub label: String,
    pub total_savings: i64,
    pub avg_duration_minutes: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DurationPoint {
    pub call: usize,
    pub minutes: i64,
    pub status: CallStatus,
}

/// Everything the page renders, built in one pass over the filtered records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardData {
    pub kpis: Kpis,
    pub outcomes: Vec<CategoryCount>,
    pub sentiments: Vec<CategoryCount>,
    pub savings_by_attempts: Vec<AttemptSavings>,
    pub rate_comparison: Vec<RatePoint>,
    pub daily: Vec<DailyPoint>,
    pub durations: Vec<DurationPoint>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub range: DateRange,
    pub showing: usize,
    pub total_available: usize,
    pub running: usize,
    pub last_updated: String,
    pub data: DashboardData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tolerates_nulls_and_unknown_status() {
        let record: MetricRecord = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "call_outcome": null,
            "call_status": "paused",
            "call_duration": null,
            "negotiation_attempts": null,
            "created_at": "2025-10-23T22:22:45.187178+00:00"
        }))
        .unwrap();

        assert_eq!(record.call_status, CallStatus::Unknown);
        assert!(record.call_outcome.is_none());
        assert_eq!(record.call_duration, 0.0);
        assert_eq!(record.negotiation_attempts, 0);
        assert!(!record.call_status.is_finished());
        assert!(!record.call_status.is_in_flight());
    }

    #[test]
    fn record_accepts_float_counts_and_numeric_ids() {
        let record: MetricRecord = serde_json::from_value(serde_json::json!({
            "id": 42,
            "call_status": "completed",
            "negotiation_attempts": 2.0,
            "created_at": "2025-10-23T22:22:45Z"
        }))
        .unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.negotiation_attempts, 2);

        let negative: MetricRecord = serde_json::from_value(serde_json::json!({
            "id": "n",
            "negotiation_attempts": -3,
            "created_at": "2025-10-23T22:22:45Z"
        }))
        .unwrap();
        assert_eq!(negative.negotiation_attempts, 0);
    }

    #[test]
    fn status_sets_are_disjoint() {
        let all = [
            CallStatus::Completed,
            CallStatus::Canceled,
            CallStatus::Failed,
            CallStatus::Running,
            CallStatus::Scheduled,
        ];
        for status in all {
            assert_ne!(status.is_finished(), status.is_in_flight(), "{status:?}");
        }
    }
}
