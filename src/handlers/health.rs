use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::app_state::AppState;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    mode: Option<String>,
}

/// Responds with the health status of the server.
///
/// - By default (no query parameters), performs a light check to confirm the web server
///   is running.
///
/// - If `mode=full` is passed as a query parameter, also pings the repository and
///   the session store.
///
/// # Responses
/// - `200 OK` with `{ "status": "ok" }` if the server (and backends, in full mode) are healthy.
/// - `500 INTERNAL SERVER ERROR` with `{ "status": "error" }` if a backend ping fails in full mode.
pub async fn health_check(
    State(state): State<AppState>,
    Query(params): Query<HealthQuery>,
) -> (StatusCode, Json<HealthResponse>) {
    // ---
    if params.mode.as_deref() != Some("full") {
        return (StatusCode::OK, Json(HealthResponse { status: "ok" }));
    }

    let repository = state.repository().ping().await;
    let sessions = state.sessions().ping().await;

    match (repository, sessions) {
        (Ok(()), Ok(())) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        (repository, sessions) => {
            if let Err(e) = repository {
                tracing::error!("repository ping failed: {e:#}");
            }
            if let Err(e) = sessions {
                tracing::error!("session store ping failed: {e:#}");
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse { status: "error" }),
            )
        }
    }
}
