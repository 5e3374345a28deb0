use crate::config::BackendConfig;
use crate::errors::ProxyError;
use reqwest::Client;
use tracing::info;

const UPDATE_METRICS_PATH: &str = "/metrics/update_metrics";

/// Forwards "refresh metrics" requests to the external backend.
pub struct BackendProxy {
    client: Client,
    config: Option<BackendConfig>,
}

impl BackendProxy {
    pub fn new(config: Option<BackendConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub async fn update_metrics(&self) -> Result<(), ProxyError> {
        let config = self.config.as_ref().ok_or(ProxyError::MissingConfig)?;

        info!("calling backend update_metrics endpoint");
        let resp = self
            .client
            .post(format!("{}{UPDATE_METRICS_PATH}", config.url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &config.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProxyError::Backend { status, body });
        }

        info!("backend update_metrics call successful");
        Ok(())
    }
}
