use crate::errors::ConfigError;
use std::env;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8080;

/// Endpoint the store client falls back to outside production when no
/// credentials are set. `.invalid` never resolves, so fetches degrade to empty.
const PLACEHOLDER_STORE_URL: &str = "https://placeholder.invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_STORE_URL, "placeholder-key")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    pub store: Option<StoreConfig>,
    pub backend: Option<BackendConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing credential pairs are
    /// fatal in production and a warning everywhere else.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match value("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let environment = match value("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let store = match (value("METRICS_STORE_URL"), value("METRICS_STORE_KEY")) {
            (Some(url), Some(key)) => Some(StoreConfig::new(url, key)),
            _ => None,
        };
        let backend = match (value("BACKEND_URL"), value("BACKEND_API_KEY")) {
            (Some(url), Some(api_key)) => Some(BackendConfig::new(url, api_key)),
            _ => None,
        };

        info!(
            ?environment,
            store_url = store.as_ref().map(|s| s.url.as_str()).unwrap_or("NOT SET"),
            backend_configured = backend.is_some(),
            "configuration loaded"
        );

        if store.is_none() {
            if environment == Environment::Production {
                return Err(ConfigError::MissingStore);
            }
            warn!("metrics store credentials are missing; dashboard will show no data");
        }
        if backend.is_none() {
            if environment == Environment::Production {
                return Err(ConfigError::MissingBackend);
            }
            warn!("backend configuration is missing; metrics refresh proxy will fail");
        }

        Ok(Self {
            port,
            environment,
            store,
            backend,
        })
    }

    pub fn store_or_placeholder(&self) -> StoreConfig {
        self.store.clone().unwrap_or_else(StoreConfig::placeholder)
    }
}
