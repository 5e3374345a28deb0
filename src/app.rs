use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route(
            "/functions/v1/update-metrics",
            post(handlers::update_metrics).layer(proxy_cors()),
        )
        .with_state(state)
}

/// Permissive CORS for the proxy route. The layer answers every OPTIONS
/// request itself.
fn proxy_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}
