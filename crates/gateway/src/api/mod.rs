pub mod fallback;
pub mod invoke;
pub mod session;
pub mod status;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::Layer;
use tower_http::trace::TraceLayer;

use crate::middleware::{self, MethodOverride, MethodOverrideLayer};
use crate::state::AppState;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 50 * 1024 * 1024;

/// The complete HTTP application: the router behind the method-override
/// rewrite. Serve it with `axum::ServiceExt::into_make_service`.
pub type App = MethodOverride<Router>;

/// Build the API router with its layers and state applied.
///
/// Every route carries a method fallback so that unsupported methods on a
/// known path get the same `502` as an unknown path instead of axum's `405`.
pub fn router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.server.cors);

    let routes = Router::new()
        .route(
            "/start_session",
            get(session::start_session).fallback(fallback::not_permitted),
        )
        .route(
            "/invoke",
            post(invoke::invoke)
                .get(fallback::post_only)
                .fallback(fallback::not_permitted),
        )
        .route(
            "/status",
            get(status::status).fallback(fallback::not_permitted),
        )
        .fallback(fallback::not_permitted)
        .layer(DefaultBodyLimit::max(BODY_LIMIT));

    middleware::security_headers(routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The router wrapped in the outermost layer.
pub fn app(state: AppState) -> App {
    MethodOverrideLayer.layer(router(state))
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Build a routing-level response: `{ "message": "<message>" }`.
pub(crate) fn api_message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "message": message.into() }))).into_response()
}
