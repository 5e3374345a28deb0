use crate::errors::AppError;
use crate::models::{DateRange, MetricRecord, RangeQuery};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const PRESETS: [(&str, u32); 3] = [("7d", 7), ("30d", 30), ("90d", 90)];

impl DateRange {
    /// Parses the `range`, `start` and `end` query parameters. Blank values
    /// count as absent.
    pub fn from_query(query: &RangeQuery) -> Result<Self, AppError> {
        let range = non_blank(query.range.as_deref()).unwrap_or("all");
        match range {
            "all" => Ok(Self::All),
            "custom" => Ok(Self::Custom {
                start: parse_date("start", query.start.as_deref())?,
                end: parse_date("end", query.end.as_deref())?,
            }),
            other => PRESETS
                .iter()
                .find(|(key, _)| *key == other)
                .map(|(_, days)| Self::LastDays { days: *days })
                .ok_or_else(|| {
                    AppError::bad_request("range must be one of all, 7d, 30d, 90d, custom")
                }),
        }
    }

    /// Query-string key of the selector, used to mark the active filter.
    pub fn key(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::LastDays { days } => format!("{days}d"),
            Self::Custom { .. } => "custom".to_string(),
        }
    }

    /// Inclusive `[start, end]` window relative to `now`, or `None` when the
    /// selector keeps every record.
    pub fn bounds_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let tz = now.timezone();
        let today = now.naive_local().date();
        match *self {
            Self::All => None,
            Self::Custom {
                start: None,
                end: None,
            } => None,
            Self::LastDays { days } => {
                let first_day = today - Duration::days(i64::from(days));
                Some((start_of_day(&tz, first_day), now.with_timezone(&Utc)))
            }
            Self::Custom { start, end } => {
                let start = start.map_or(DateTime::<Utc>::MIN_UTC, |day| start_of_day(&tz, day));
                let end = end_of_day(&tz, end.unwrap_or(today));
                Some((start, end))
            }
        }
    }
}

pub fn filter_records(records: &[MetricRecord], range: &DateRange) -> Vec<MetricRecord> {
    filter_records_at(records, range, &Local::now())
}

pub fn filter_records_at<Tz: TimeZone>(
    records: &[MetricRecord],
    range: &DateRange,
    now: &DateTime<Tz>,
) -> Vec<MetricRecord> {
    match range.bounds_at(now) {
        None => records.to_vec(),
        Some((start, end)) => records
            .iter()
            .filter(|record| record.created_at >= start && record.created_at <= end)
            .cloned()
            .collect(),
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| from_utc(tz, naive))
        .with_timezone(&Utc)
}

fn end_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN) + Duration::milliseconds(86_399_999);
    tz.from_local_datetime(&naive)
        .latest()
        .unwrap_or_else(|| from_utc(tz, naive))
        .with_timezone(&Utc)
}

// Local times skipped by a DST jump have no mapping; read them as UTC.
fn from_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_utc_datetime(&naive)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    non_blank(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::bad_request(format!("{field} must be a YYYY-MM-DD date")))
        })
        .transpose()
}
