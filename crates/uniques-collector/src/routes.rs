//! HTTP routes

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;
use crate::{
    COLLECTOR_VERSION, COLLECT_PATH, CONTENT_TYPE_FORM, DAILY_UNIQUES_PATH, HEALTH_PATH,
    MONTHLY_UNIQUES_PATH,
};

// ============ REQUEST TYPES ============

/// `/collect` query; missing parameters read as empty and fail validation
#[derive(Debug, Default, Deserialize)]
pub struct CollectParams {
    #[serde(default)]
    pub cid: String,
    pub d: Option<String>,
}

/// `/daily_uniques` and `/monthly_uniques` query
#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
    #[serde(default)]
    pub d: String,
}

// ============ HANDLERS ============

async fn collect(
    State(state): State<AppState>,
    Query(params): Query<CollectParams>,
) -> Result<impl IntoResponse, ApiError> {
    handlers::record(
        state.store.as_ref(),
        &params.cid,
        params.d.as_deref(),
        state.deadline(),
    )
    .await?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE_FORM)]))
}

async fn daily_uniques(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<impl IntoResponse, ApiError> {
    let count = handlers::daily_count(state.store.as_ref(), &params.d, state.deadline()).await?;
    Ok(count_response(count))
}

async fn monthly_uniques(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Result<impl IntoResponse, ApiError> {
    let count = handlers::monthly_count(state.store.as_ref(), &params.d, state.deadline()).await?;
    Ok(count_response(count))
}

fn count_response(count: u64) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE_FORM)],
        count.to_string(),
    )
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping(state.deadline()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "version": COLLECTOR_VERSION,
            })),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "version": COLLECTOR_VERSION,
                    "error": e.to_string(),
                })),
            )
        }
    }
}

// ============ ROUTER ============

/// Build the collector router around `state`
pub fn create_router(state: AppState) -> Router {
    // Pings come straight from browsers on other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route(COLLECT_PATH, get(collect))
        .route(DAILY_UNIQUES_PATH, get(daily_uniques))
        .route(MONTHLY_UNIQUES_PATH, get(monthly_uniques))
        .route(HEALTH_PATH, get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
