use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Liveness plus a database round trip. The auth provider is not probed.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let version = env!("CARGO_PKG_VERSION");

    if db_ok {
        (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "version": version })),
        )
    } else {
        tracing::warn!("Health check: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "db": "disconnected", "version": version })),
        )
    }
}
