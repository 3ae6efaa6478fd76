use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

/// `GET /status`: heartbeat with the effective settings. The model
/// configuration serializes without its API key.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let server = &state.config.server;
    Json(serde_json::json!({
        "port": server.port,
        "loglevel": server.log_level,
        "modelconfig": state.config.model,
    }))
}
