//! Static responses for requests the API does not serve.

use axum::http::{StatusCode, Uri};
use axum::response::Response;

use super::api_message;

/// Path and query as the client sent them.
fn request_target(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

/// `GET /invoke`: the endpoint exists but only accepts `POST`.
pub async fn post_only(uri: Uri) -> Response {
    api_message(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!(
            "Error (synapse): Access to {} is only as a POST request",
            request_target(&uri)
        ),
    )
}

/// Any path or method not explicitly routed.
pub async fn not_permitted(uri: Uri) -> Response {
    tracing::debug!(uri = %uri, "rejecting unrouted request");
    api_message(
        StatusCode::BAD_GATEWAY,
        format!(
            "Error (synapse): Access to {} is not permitted.",
            request_target(&uri)
        ),
    )
}
