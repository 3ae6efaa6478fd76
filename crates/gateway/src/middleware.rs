//! Cross-cutting HTTP layers: method override, CORS and security headers.

use std::task::{Context, Poll};

use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use axum::Router;
use tower::{Layer, Service};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use synapse_domain::config::CorsConfig;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// X-HTTP-Method-Override
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const METHOD_OVERRIDE_HEADER: HeaderName = HeaderName::from_static("x-http-method-override");

/// Rewrites the method of a `POST` carrying `X-HTTP-Method-Override`.
///
/// Must wrap the router from the outside: routing has already happened by
/// the time a router-level layer sees the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodOverrideLayer;

impl<S> Layer<S> for MethodOverrideLayer {
    type Service = MethodOverride<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodOverride { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MethodOverride<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for MethodOverride<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        apply_method_override(&mut req);
        self.inner.call(req)
    }
}

/// Only `POST` may be overridden; unparseable values are ignored.
pub fn apply_method_override<B>(req: &mut Request<B>) {
    if req.method() != Method::POST {
        return;
    }
    let Some(value) = req.headers().get(&METHOD_OVERRIDE_HEADER) else {
        return;
    };
    let parsed = value
        .to_str()
        .ok()
        .map(|s| s.trim().to_ascii_uppercase())
        .and_then(|s| Method::from_bytes(s.as_bytes()).ok());

    match parsed {
        Some(method) => {
            tracing::debug!(from = %req.method(), to = %method, "method override");
            *req.method_mut() = method;
        }
        None => tracing::debug!("ignoring unparseable X-HTTP-Method-Override"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CORS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const CORS_METHODS: [Method; 7] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// One configured origin: exact, or `scheme://host:*` for any port.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OriginRule {
    Exact(String),
    AnyPort(String),
}

impl OriginRule {
    fn parse(raw: &str) -> Self {
        match raw.strip_suffix('*') {
            Some(host) if host.ends_with(':') => OriginRule::AnyPort(host.to_owned()),
            _ => OriginRule::Exact(raw.to_owned()),
        }
    }

    fn matches(&self, origin: &str) -> bool {
        match self {
            OriginRule::Exact(exact) => exact == origin,
            OriginRule::AnyPort(host) => origin
                .strip_prefix(host.as_str())
                .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
        }
    }
}

/// Build a [`CorsLayer`] from the configured allowed origins.
///
/// An empty list reflects the caller's `Origin` back with credentials. A lone
/// `"*"` allows every origin without credentials. Otherwise the `Origin` is
/// reflected only when a rule matches it.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_origin = match cors.allowed_origins.as_slice() {
        [] => AllowOrigin::mirror_request(),
        [only] if only == "*" => {
            tracing::warn!("CORS configured with wildcard \"*\": all origins allowed");
            return CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(CORS_METHODS)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, METHOD_OVERRIDE_HEADER]);
        }
        origins => {
            let rules: Vec<OriginRule> = origins.iter().map(|o| OriginRule::parse(o)).collect();
            AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                origin
                    .to_str()
                    .is_ok_and(|origin| rules.iter().any(|rule| rule.matches(origin)))
            })
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(CORS_METHODS)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Security headers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const HSTS: &str = "max-age=31536000; includeSubDomains";
pub const CSP: &str = "default-src 'self'; frame-ancestors 'self'; form-action 'self'";

/// Add the hardening headers to every response that does not set them.
pub fn security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CSP),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
}
