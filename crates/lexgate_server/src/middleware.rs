//! Admission middleware for the lexgate server.
//!
//! Every request passes through [`admission`] before reaching a handler: the
//! client identity is derived from request metadata, the engine decides
//! admission, and the decision is attached to the request so downstream
//! handlers can read it. Rejections short-circuit into an HTTP 429 with the
//! structured error body; quota headers are stamped on every response either
//! way.

use crate::response::RateLimitErrorBody;
use crate::routes::AppState;
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lexgate_rate_limit::{ClientIdentity, Decision, RequestMeta};
use std::net::SocketAddr;
use tracing::warn;

/// Decide admission for a request, then either reject with a 429 or delegate
/// to the inner handler.
///
/// The derived [`ClientIdentity`] and the [`Decision`] are inserted into the
/// request extensions for handlers such as `my-usage`.
pub async fn admission(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let meta = request_meta(request.headers(), connect_info.map(|ConnectInfo(addr)| addr));
    let identity = ClientIdentity::from_meta(&meta);
    let route = request.uri().path().to_string();

    let decision = state.limiter().check(&identity, &route);

    if !decision.allowed {
        return rejection_response(&decision);
    }

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(decision.clone());

    let mut response = next.run(request).await;
    apply_quota_headers(response.headers_mut(), &decision);
    response
}

/// Capture the identity-relevant request metadata.
fn request_meta(headers: &HeaderMap, addr: Option<SocketAddr>) -> RequestMeta {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    RequestMeta {
        authorization: get(header::AUTHORIZATION.as_str()),
        api_key: get("x-api-key"),
        user_agent: get(header::USER_AGENT.as_str()),
        forwarded_for: get("x-forwarded-for"),
        remote_addr: addr.map(|a| a.ip().to_string()),
    }
}

/// Build the 429 response for a rejected decision.
fn rejection_response(decision: &Decision) -> Response {
    let body = RateLimitErrorBody::from_decision(decision);
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    apply_quota_headers(response.headers_mut(), decision);
    response
}

/// Stamp the standard quota headers onto a response.
fn apply_quota_headers(headers: &mut HeaderMap, decision: &Decision) {
    for (name, value) in decision.headers() {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = name, "skipping malformed quota header"),
        }
    }
}
