use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::models::{MetricRecord, MetricSets};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info, warn};

const METRICS_PATH: &str = "/rest/v1/metrics?select=*&order=created_at.desc";
const RECOMPUTE_PATH: &str = "/functions/v1/update-metrics";

/// Read side of the remote metrics table plus its recompute hook.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Asks the store to recompute metrics. The payload is only useful for logs.
    async fn recompute(&self) -> Result<serde_json::Value, StoreError>;

    /// All rows, newest first.
    async fn records(&self) -> Result<Vec<MetricRecord>, StoreError>;
}

/// PostgREST-style client for the hosted store.
pub struct RestStore {
    client: Client,
    config: StoreConfig,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }
}

#[async_trait]
impl MetricsStore for RestStore {
    async fn recompute(&self) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}{RECOMPUTE_PATH}", self.config.url);
        let resp = self.authorized(self.client.post(&url)).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }

    async fn records(&self) -> Result<Vec<MetricRecord>, StoreError> {
        let url = format!("{}{METRICS_PATH}", self.config.url);
        let resp = self.authorized(self.client.get(&url)).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let rows: Vec<serde_json::Value> = resp.json().await?;
        Ok(decode_rows(rows))
    }
}

/// Decodes rows one at a time. A row that does not fit is logged and skipped
/// without dropping its neighbours.
fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<MetricRecord> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, "skipping malformed metrics row: {err}");
                None
            }
        })
        .collect()
}

/// Fires the remote recompute. Failure leaves stale data in place, so it is
/// only logged.
pub async fn trigger_recompute(store: &dyn MetricsStore) {
    match store.recompute().await {
        Ok(payload) => info!(%payload, "update-metrics responded"),
        Err(err) => error!("error calling update-metrics function: {err}"),
    }
}

/// Fetches every record and splits it by status. A failed query yields two
/// empty sets.
pub async fn fetch_all(store: &dyn MetricsStore) -> MetricSets {
    let records = match store.records().await {
        Ok(records) => records,
        Err(err) => {
            error!("error fetching metrics: {err}");
            return MetricSets::default();
        }
    };

    let total = records.len();
    let sets = partition(records);
    info!(
        total,
        completed = sets.completed.len(),
        running = sets.running.len(),
        "fetched metrics"
    );
    sets
}

pub fn partition(records: Vec<MetricRecord>) -> MetricSets {
    let mut sets = MetricSets::default();
    for record in records {
        if record.call_status.is_finished() {
            sets.completed.push(record);
        } else if record.call_status.is_in_flight() {
            sets.running.push(record);
        }
    }
    sets
}
