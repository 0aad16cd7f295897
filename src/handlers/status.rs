use crate::startup::AppState;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Root status page. HEAD requests get the same headers with the body
/// stripped by the server.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "AI question bank server is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/answer"],
        "status": "running",
        "model_in_use": state.config.upstream.model,
    }))
}

/// Fallback for every unrouted method/path pair.
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::warn!(method = %method, path = %uri.path(), "Unknown API path");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Unknown API path",
            "available_paths": ["/", "/answer"],
            "method": method.as_str(),
            "path": uri.path(),
        })),
    )
}
