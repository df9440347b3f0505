//! axum middleware applying a `RateLimiter` to requests

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::SecondsFormat;
use serde_json::json;

use super::{RateDecision, RateLimiter, RateStatus};

/// Identity used to key rate-limit state: the peer IP address
pub fn client_identity(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Counts the request against `limiter`, rejecting it with 429 when over the limit
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let identity = client_identity(&request);

    match limiter.check(&identity) {
        RateDecision::Allowed(status) => {
            let mut response = next.run(request).await;
            set_limit_headers(&limiter, &status, response.headers_mut());
            response
        }
        RateDecision::Limited(status) => {
            let tier = limiter.tier();
            let retry_after = status.retry_after_secs();
            tracing::warn!(
                tier = tier.name(),
                client = %identity,
                limit = status.limit,
                retry_after,
                "rate limit exceeded"
            );

            let body = json!({
                "error": tier.error(),
                "message": tier.message(),
                "retryAfter": retry_after,
            });
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            set_limit_headers(&limiter, &status, response.headers_mut());
            response
        }
    }
}

fn set_limit_headers(limiter: &RateLimiter, status: &RateStatus, headers: &mut HeaderMap) {
    let [limit, remaining, reset] = limiter.tier().header_names();
    let reset_at = status.reset_at().to_rfc3339_opts(SecondsFormat::Millis, true);

    headers.insert(HeaderName::from_static(limit), HeaderValue::from(status.limit));
    headers.insert(
        HeaderName::from_static(remaining),
        HeaderValue::from(status.remaining),
    );
    if let Ok(value) = HeaderValue::from_str(&reset_at) {
        headers.insert(HeaderName::from_static(reset), value);
    }
}
