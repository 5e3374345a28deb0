use crate::format::{attempts_label, round_half_up, round_to};
use crate::models::{
    AttemptSavings, CallStatus, CategoryCount, DailyPoint, DashboardData, DurationPoint, Kpis,
    MetricRecord, RatePoint,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const RATE_COMPARISON_CALLS: usize = 10;
const UNKNOWN_LABEL: &str = "unknown";

#[derive(Default)]
struct DayTotals {
    savings: f64,
    duration: f64,
    calls: usize,
}

#[derive(Default)]
struct AttemptTotals {
    savings: f64,
    calls: usize,
}

/// Aggregates the filtered records (newest first) into every KPI and chart
/// dataset in a single pass.
pub fn build_dashboard(records: &[MetricRecord]) -> DashboardData {
    let total = records.len();
    let mut completed = 0usize;
    let mut duration_sum = 0f64;
    let mut attempts_sum = 0f64;
    let mut savings_sum = 0f64;
    let mut rate_difference_sum = 0f64;

    let mut outcomes: Vec<(String, usize)> = Vec::new();
    let mut sentiments: Vec<(String, usize)> = Vec::new();
    let mut by_attempts: BTreeMap<u32, AttemptTotals> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    let mut rate_comparison = Vec::with_capacity(RATE_COMPARISON_CALLS.min(total));
    let mut durations = Vec::with_capacity(total);

    for (index, record) in records.iter().enumerate() {
        if record.call_status == CallStatus::Completed {
            completed += 1;
        }
        duration_sum += record.call_duration;
        attempts_sum += f64::from(record.negotiation_attempts);
        savings_sum += record.negotiation_performance;
        rate_difference_sum += record.rate_difference;

        bump(&mut outcomes, record.call_outcome.as_deref());
        bump(&mut sentiments, record.carrier_sentiment.as_deref());

        let group = by_attempts.entry(record.negotiation_attempts).or_default();
        group.savings += record.negotiation_performance;
        group.calls += 1;

        let day = by_day.entry(record.created_at.date_naive()).or_default();
        day.savings += record.negotiation_performance;
        day.duration += record.call_duration;
        day.calls += 1;

        if index < RATE_COMPARISON_CALLS {
            rate_comparison.push((
                record.load_loadboard_rate,
                record.carrier_initial_offer,
                record.load_agreed_rate,
            ));
        }

        durations.push(DurationPoint {
            call: index + 1,
            minutes: round_half_up(record.call_duration / 60.0),
            status: record.call_status,
        });
    }

    let average = |sum: f64| if total == 0 { 0.0 } else { sum / total as f64 };
    let success_rate = if total == 0 {
        0.0
    } else {
        round_to(completed as f64 / total as f64 * 100.0, 1)
    };

    let kpis = Kpis {
        total_calls: total,
        completed_calls: completed,
        success_rate,
        avg_call_duration_secs: round_half_up(average(duration_sum)),
        avg_negotiation_attempts: round_to(average(attempts_sum), 1),
        total_savings: round_half_up(savings_sum),
        avg_savings: round_half_up(average(savings_sum)),
        avg_rate_difference: round_half_up(average(rate_difference_sum)),
    };

    let savings_by_attempts = by_attempts
        .into_iter()
        .map(|(attempts, group)| AttemptSavings {
            attempts,
            label: attempts_label(attempts),
            avg_savings: round_half_up(group.savings / group.calls as f64),
            total_savings: round_half_up(group.savings),
            count: group.calls,
        })
        .collect();

    let daily = by_day
        .into_iter()
        .map(|(date, day)| DailyPoint {
            date: date.format("%Y-%m-%d").to_string(),
            label: date.format("%b %d").to_string(),
            total_savings: round_half_up(day.savings),
            avg_duration_minutes: round_to(day.duration / day.calls as f64 / 60.0, 1),
        })
        .collect();

    // Oldest of the recent calls first.
    rate_comparison.reverse();
    let rate_comparison = rate_comparison
        .into_iter()
        .enumerate()
        .map(|(index, (loadboard_rate, carrier_offer, agreed_rate))| RatePoint {
            label: format!("Call {}", index + 1),
            loadboard_rate,
            carrier_offer,
            agreed_rate,
        })
        .collect();

    DashboardData {
        kpis,
        outcomes: to_histogram(outcomes, total),
        sentiments: to_histogram(sentiments, total),
        savings_by_attempts,
        rate_comparison,
        daily,
        durations,
    }
}

fn bump(counts: &mut Vec<(String, usize)>, label: Option<&str>) {
    let label = label.unwrap_or(UNKNOWN_LABEL);
    match counts.iter_mut().find(|(existing, _)| existing == label) {
        Some((_, count)) => *count += 1,
        None => counts.push((label.to_string(), 1)),
    }
}

fn to_histogram(counts: Vec<(String, usize)>, total: usize) -> Vec<CategoryCount> {
    counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            percent: round_to(count as f64 / total as f64 * 100.0, 1),
            label,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;

    fn record(
        id: &str,
        created_at: &str,
        status: CallStatus,
        outcome: &str,
        attempts: u32,
        savings: f64,
        duration: f64,
    ) -> MetricRecord {
        MetricRecord {
            id: id.to_string(),
            run_id: Some("run".to_string()),
            organization_id: Some("org".to_string()),
            call_outcome: Some(outcome.to_string()),
            carrier_sentiment: Some("neutral".to_string()),
            call_status: status,
            call_duration: duration,
            negotiation_attempts: attempts,
            load_loadboard_rate: 1000.0,
            carrier_initial_offer: 1200.0,
            load_agreed_rate: 1100.0,
            rate_difference: 100.0,
            negotiation_performance: savings,
            created_at: created_at.parse().unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn single_completed_call() {
        let mut only = record(
            "1",
            "2025-10-23T22:22:45.187178+00:00",
            CallStatus::Completed,
            "accepted",
            2,
            150.0,
            300.0,
        );
        only.carrier_sentiment = Some("positive".to_string());

        let data = build_dashboard(&[only]);

        assert_eq!(
            data.outcomes,
            vec![CategoryCount {
                label: "accepted".to_string(),
                count: 1,
                percent: 100.0
            }]
        );
        assert_eq!(data.sentiments[0].label, "positive");
        assert_eq!(format::one_decimal(data.kpis.avg_negotiation_attempts), "2.0");
        assert_eq!(format::duration(data.kpis.avg_call_duration_secs), "5m 0s");
        assert_eq!(format::signed_currency(data.kpis.total_savings), "+$150");
        assert_eq!(format::one_decimal(data.kpis.success_rate), "100.0");
        assert_eq!(data.daily.len(), 1);
        assert_eq!(data.daily[0].date, "2025-10-23");
        assert_eq!(data.daily[0].label, "Oct 23");
        assert_eq!(data.daily[0].avg_duration_minutes, 5.0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let data = build_dashboard(&[]);
        assert_eq!(data.kpis.total_calls, 0);
        assert_eq!(data.kpis.completed_calls, 0);
        assert_eq!(format::one_decimal(data.kpis.success_rate), "0.0");
        assert_eq!(data.kpis.avg_call_duration_secs, 0);
        assert_eq!(data.kpis.total_savings, 0);
        assert!(data.outcomes.is_empty());
        assert!(data.sentiments.is_empty());
        assert!(data.savings_by_attempts.is_empty());
        assert!(data.rate_comparison.is_empty());
        assert!(data.daily.is_empty());
        assert!(data.durations.is_empty());
    }

    #[test]
    fn group_counts_cover_every_record() {
        let records = vec![
            record("1", "2025-10-03T10:00:00Z", CallStatus::Completed, "accepted", 1, 50.0, 60.0),
            record("2", "2025-10-01T10:00:00Z", CallStatus::Failed, "rejected", 3, -20.0, 90.0),
            record("3", "2025-10-02T10:00:00Z", CallStatus::Canceled, "accepted", 1, 10.0, 30.0),
            record("4", "2025-10-01T23:00:00Z", CallStatus::Completed, "no_answer", 0, 0.0, 10.0),
        ];
        let data = build_dashboard(&records);

        let outcome_total: usize = data.outcomes.iter().map(|c| c.count).sum();
        let sentiment_total: usize = data.sentiments.iter().map(|c| c.count).sum();
        let attempt_total: usize = data.savings_by_attempts.iter().map(|g| g.count).sum();
        assert_eq!(outcome_total, records.len());
        assert_eq!(sentiment_total, records.len());
        assert_eq!(attempt_total, records.len());

        let labels: Vec<_> = data.outcomes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["accepted", "rejected", "no_answer"]);

        assert_eq!(data.kpis.completed_calls, 2);
        assert_eq!(data.kpis.success_rate, 50.0);
        assert!((0.0..=100.0).contains(&data.kpis.success_rate));
    }

    #[test]
    fn savings_grouped_by_attempts_in_ascending_order() {
        let records = vec![
            record("1", "2025-10-03T10:00:00Z", CallStatus::Completed, "a", 3, -25.0, 60.0),
            record("2", "2025-10-03T09:00:00Z", CallStatus::Completed, "a", 1, 100.0, 60.0),
            record("3", "2025-10-03T08:00:00Z", CallStatus::Completed, "a", 1, 51.0, 60.0),
            record("4", "2025-10-03T07:00:00Z", CallStatus::Completed, "a", 3, -30.0, 60.0),
        ];
        let data = build_dashboard(&records);

        let groups = &data.savings_by_attempts;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].attempts, 1);
        assert_eq!(groups[0].label, "1 attempt");
        assert_eq!(groups[0].avg_savings, 76);
        assert_eq!(groups[0].total_savings, 151);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].label, "3 attempts");
        assert_eq!(groups[1].avg_savings, -27);
        assert_eq!(groups[1].total_savings, -55);
        assert_eq!(data.kpis.total_savings, 96);
        assert_eq!(data.kpis.avg_savings, 24);
    }

    #[test]
    fn rate_comparison_takes_ten_most_recent_in_chronological_order() {
        let records: Vec<_> = (0..12)
            .map(|i| {
                let mut r = record(
                    &i.to_string(),
                    "2025-10-03T10:00:00Z",
                    CallStatus::Completed,
                    "accepted",
                    1,
                    0.0,
                    60.0,
                );
                r.load_loadboard_rate = f64::from(i);
                r
            })
            .collect();
        let data = build_dashboard(&records);

        assert_eq!(data.rate_comparison.len(), 10);
        assert_eq!(data.rate_comparison[0].label, "Call 1");
        assert_eq!(data.rate_comparison[0].loadboard_rate, 9.0);
        assert_eq!(data.rate_comparison[9].label, "Call 10");
        assert_eq!(data.rate_comparison[9].loadboard_rate, 0.0);
    }

    #[test]
    fn daily_series_is_sorted_and_unique() {
        let records = vec![
            record("1", "2025-10-05T01:00:00Z", CallStatus::Completed, "a", 1, 10.0, 120.0),
            record("2", "2025-10-03T10:00:00Z", CallStatus::Completed, "a", 1, 20.4, 60.0),
            record("3", "2025-10-05T23:59:00Z", CallStatus::Completed, "a", 1, 5.0, 30.0),
            record("4", "2025-10-04T00:00:00+02:00", CallStatus::Completed, "a", 1, 1.0, 60.0),
        ];
        let data = build_dashboard(&records);

        let keys: Vec<_> = data.daily.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(keys, ["2025-10-03", "2025-10-05"]);
        assert_eq!(data.daily[0].total_savings, 21);
        assert_eq!(data.daily[0].avg_duration_minutes, 1.0);
        assert_eq!(data.daily[1].total_savings, 15);
        assert_eq!(data.daily[1].avg_duration_minutes, 1.3);
    }

    #[test]
    fn missing_categories_are_grouped_as_unknown() {
        let mut r = record("1", "2025-10-03T10:00:00Z", CallStatus::Failed, "x", 0, 0.0, 0.0);
        r.call_outcome = None;
        r.carrier_sentiment = None;
        let data = build_dashboard(&[r]);
        assert_eq!(data.outcomes[0].label, "unknown");
        assert_eq!(data.sentiments[0].label, "unknown");
        assert_eq!(data.durations[0].status, CallStatus::Failed);
    }
}
