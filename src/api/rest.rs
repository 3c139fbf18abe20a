// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Report requests draw from the shared
// fixed-window limiter; the health endpoint does not.
//
// CORS is configured permissively so browser dashboards can call the API
// directly.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::api::rate_limit::RateLimitSnapshot;
use crate::app_state::AppState;
use crate::reports::run_report;
use crate::types::{normalize_symbol, ReportKind};

const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/reports/:kind/:symbol", get(report))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
    rate_limit: RateLimitSnapshot,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        rate_limit: state.rate_limit.snapshot(),
    };
    Json(resp)
}

// =============================================================================
// Reports
// =============================================================================

async fn report(
    State(state): State<Arc<AppState>>,
    Path((kind, symbol)): Path<(String, String)>,
) -> Response {
    if !state.rate_limit.try_acquire() {
        return error_response(StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS);
    }

    let kind: ReportKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            debug!(error = %e, "unknown report kind requested");
            return error_response(StatusCode::NOT_FOUND, &e.to_string());
        }
    };

    let symbol = normalize_symbol(&symbol);
    info!(%kind, symbol = %symbol, "report requested");

    let body = run_report(kind, &symbol, &state.client, &state.config).await;
    Json(body).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// =============================================================================
// Tests
// =============================================================================
