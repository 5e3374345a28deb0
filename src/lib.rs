pub mod app;
pub mod charts;
pub mod config;
pub mod errors;
pub mod filter;
pub mod format;
pub mod handlers;
pub mod models;
pub mod proxy;
pub mod stats;
pub mod store;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use store::{MetricsStore, RestStore};
