use crate::errors::AppError;
use crate::filter::filter_records;
use crate::models::{DashboardResponse, DateRange, ProxyResponse, RangeQuery};
use crate::state::AppState;
use crate::stats::build_dashboard;
use crate::store::{fetch_all, trigger_recompute};
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Local;
use tracing::error;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Html<String>, AppError> {
    let range = DateRange::from_query(&query)?;
    let dashboard = load_dashboard(&state, range).await;
    Ok(Html(render_index(&dashboard)))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let range = DateRange::from_query(&query)?;
    Ok(Json(load_dashboard(&state, range).await))
}

pub async fn update_metrics(State(state): State<AppState>) -> (StatusCode, Json<ProxyResponse>) {
    match state.proxy.update_metrics().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ProxyResponse {
                success: true,
                message: Some("Metrics updated successfully".to_string()),
                error: None,
            }),
        ),
        Err(err) => {
            error!("error in update-metrics proxy: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyResponse {
                    success: false,
                    message: None,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}

/// Recompute, then fetch, then filter and aggregate. Remote failures have
/// already been logged and degrade to an empty dashboard.
async fn load_dashboard(state: &AppState, range: DateRange) -> DashboardResponse {
    trigger_recompute(state.store.as_ref()).await;
    let sets = fetch_all(state.store.as_ref()).await;
    let filtered = filter_records(&sets.completed, &range);

    DashboardResponse {
        range,
        showing: filtered.len(),
        total_available: sets.completed.len(),
        running: sets.running.len(),
        last_updated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        data: build_dashboard(&filtered),
    }
}
