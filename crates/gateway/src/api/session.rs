use axum::response::{IntoResponse, Json};

use synapse_sessions::new_session_id;

/// `GET /start_session`: mint a fresh session id. Nothing is stored until
/// the first invocation for it.
pub async fn start_session() -> impl IntoResponse {
    Json(serde_json::json!({ "sessionId": new_session_id() }))
}
