use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::routes::AppState;

/// GET / - service name, version and route overview
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": "SoftDesk API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Project and issue tracking API with contributor based access control",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "projects": "/projects[/:project_id] (protected)",
                "contributors": "/projects/:project_id/users[/:user_id] (protected)",
                "issues": "/projects/:project_id/issues[/:issue_id] (protected)",
                "comments": "/projects/:project_id/issues/:issue_id/comments[/:comment_id] (protected)",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    health_report(state.store.health_check().await)
}

/// Store failures are logged; the response only says the store is down.
fn health_report(check: Result<(), DatabaseError>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match check {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
