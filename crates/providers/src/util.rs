//! Shared helpers for provider adapters.

use std::time::{Duration, Instant};

use serde_json::Value;
use synapse_domain::error::{Error, Result};
use synapse_domain::message::Usage;
use synapse_domain::trace::TraceEvent;

/// Overall per-request timeout for provider HTTP calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`]. The request URL is stripped: it may carry credentials
/// and the message can reach the HTTP caller.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    let e = e.without_url();
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Build the shared HTTP client. Failure here means the backend cannot be
/// used at all, so it is reported as unavailable rather than misconfigured.
pub(crate) fn build_client(provider: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::BackendUnavailable {
            provider: provider.to_owned(),
            message: format!("HTTP client construction failed: {e}"),
        })
}

/// Send a prepared request and decode the JSON body, turning non-2xx
/// statuses into [`Error::Provider`] with the status and body text.
pub(crate) async fn send_json(provider: &str, req: reqwest::RequestBuilder) -> Result<Value> {
    let resp = req.send().await.map_err(from_reqwest)?;

    let status = resp.status();
    let resp_text = resp.text().await.map_err(from_reqwest)?;

    if !status.is_success() {
        return Err(Error::Provider {
            provider: provider.to_owned(),
            message: format!("HTTP {} - {}", status.as_u16(), resp_text),
        });
    }

    serde_json::from_str(&resp_text).map_err(|e| Error::Provider {
        provider: provider.to_owned(),
        message: format!("malformed response body: {e}"),
    })
}

/// Emit the per-call trace event.
pub(crate) fn trace_request(provider: &str, model: &str, started: Instant, usage: Option<&Usage>) {
    TraceEvent::LlmRequest {
        provider: provider.to_owned(),
        model: model.to_owned(),
        duration_ms: started.elapsed().as_millis() as u64,
        prompt_tokens: usage.map(|u| u.prompt_tokens),
        completion_tokens: usage.map(|u| u.completion_tokens),
    }
    .emit();
}

/// Read a `u32` counter out of a JSON object, tolerating absence.
pub(crate) fn u32_field(v: &Value, key: &str) -> Option<u32> {
    v.get(key)
        .and_then(|n| n.as_u64())
        .and_then(|n| u32::try_from(n).ok())
}
