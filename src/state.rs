use crate::config::AppConfig;
use crate::proxy::BackendProxy;
use crate::store::{MetricsStore, RestStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetricsStore>,
    pub proxy: Arc<BackendProxy>,
}

impl AppState {
    pub fn new(store: Arc<dyn MetricsStore>, proxy: BackendProxy) -> Self {
        Self {
            store,
            proxy: Arc::new(proxy),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(RestStore::new(config.store_or_placeholder())),
            BackendProxy::new(config.backend.clone()),
        )
    }
}
