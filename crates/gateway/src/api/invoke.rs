//! `POST /invoke`: the chat entry point.
//!
//! The body is read raw so that any `*/json` content type (or none at all)
//! is accepted, and so that every malformed body is a `400` in the API's
//! own error shape rather than an extractor rejection.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use synapse_domain::error::{Error, Result};

use super::api_error;
use crate::runtime::{self, InvocationRequest};
use crate::state::AppState;

const EMPTY_BODY: &str = "Request body is empty. Input and sessionId are required.";

pub async fn invoke(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request = match parse_body(&headers, &body) {
        Ok(r) => r,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match runtime::invoke(state.model.as_ref(), state.history.as_ref(), request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) if e.is_validation() => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Error in /invoke");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred. Details: {e}"),
            )
        }
    }
}

/// Whether the declared content type is one we parse as JSON.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or("").trim();
    essence
        .split_once('/')
        .is_some_and(|(_, subtype)| subtype.eq_ignore_ascii_case("json"))
}

fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<InvocationRequest> {
    // A body we do not parse counts as empty.
    if body.iter().all(u8::is_ascii_whitespace) || !is_json_content_type(headers) {
        return Err(Error::Validation(EMPTY_BODY.into()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("Request body is not valid JSON: {e}")))?;

    match value.as_object() {
        Some(obj) if obj.is_empty() => return Err(Error::Validation(EMPTY_BODY.into())),
        Some(_) => {}
        None => {
            return Err(Error::Validation(
                "Request body must be a JSON object. Input and sessionId are required.".into(),
            ))
        }
    }

    serde_json::from_value(value)
        .map_err(|e| Error::Validation(format!("Invalid request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_type(ct: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        h
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type(&HeaderMap::new()));
        assert!(is_json_content_type(&with_type("application/json")));
        assert!(is_json_content_type(&with_type("text/json; charset=utf-8")));
        assert!(!is_json_content_type(&with_type("text/plain")));
        assert!(!is_json_content_type(&with_type("application/x-www-form-urlencoded")));
    }

    #[test]
    fn empty_and_non_object_bodies_are_rejected() {
        let h = HeaderMap::new();
        for body in ["", "   ", "{}"] {
            let err = parse_body(&h, body.as_bytes()).unwrap_err();
            assert_eq!(err.to_string(), EMPTY_BODY);
        }
        assert!(parse_body(&h, b"[1,2]").unwrap_err().is_validation());
        assert!(parse_body(&h, b"{not json").unwrap_err().is_validation());
        assert!(parse_body(&h, br#"{"input": 42, "sessionId": "s"}"#)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn text_json_body_parses() {
        let req = parse_body(
            &with_type("text/json"),
            br#"{"input":"hi","sessionId":"s1","extra":true}"#,
        )
        .unwrap();
        assert_eq!(req.input.as_deref(), Some("hi"));
        assert_eq!(req.session_id.as_deref(), Some("s1"));
    }
}
