//! Translation of failures into HTTP responses

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::proxy::ProxyError;
use crate::upstream::UpstreamError;

/// Seconds a client is told to wait when the NASA API is rate limiting us
const UPSTREAM_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug)]
pub enum AppError {
    /// Internal errors - logged but return generic 500 to user
    Internal(anyhow::Error),
    /// Malformed or missing request parameters - safe to show
    Validation(String),
    /// Upstream failures - message already safe to show
    Proxy(ProxyError),
}

/// Detail of an internal error, attached to the response for non-production builds
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn error_body(message: &str) -> Value {
    json!({ "error": message, "timestamp": timestamp() })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Internal(err) => {
                tracing::error!("internal error: {:?}", err);
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(error_body("Internal Server Error")),
                )
                    .into_response();
                response
                    .extensions_mut()
                    .insert(InternalErrorDetail(format!("{:?}", err)));
                response
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(error_body(&msg))).into_response()
            }
            AppError::Proxy(err) => proxy_error_response(err),
        }
    }
}

fn proxy_error_response(err: ProxyError) -> Response {
    let status = proxy_status(&err);
    let mut body = error_body(&err.to_string());
    body["category"] = json!(err.endpoint().label());

    match &err {
        ProxyError::UpstreamData(upstream) => {
            if let Some(upstream_status) = upstream.status() {
                body["upstreamStatus"] = json!(upstream_status);
            }
        }
        ProxyError::UpstreamRateLimited { .. } => {
            body["retryAfter"] = json!(UPSTREAM_RETRY_AFTER_SECS);
        }
        _ => {}
    }

    let mut response = (status, Json(body)).into_response();
    if matches!(err, ProxyError::UpstreamRateLimited { .. }) {
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(UPSTREAM_RETRY_AFTER_SECS));
    }
    response
}

/// Status returned to our client for an upstream failure
///
/// Client errors the caller can fix (400, 404) pass through; everything that
/// is the proxy's or the API's fault becomes a gateway error.
fn proxy_status(err: &ProxyError) -> StatusCode {
    match err {
        ProxyError::UpstreamRateLimited { .. } | ProxyError::UpstreamUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ProxyError::UpstreamData(UpstreamError::Status { status, .. }) => match status {
            400 => StatusCode::BAD_REQUEST,
            404 => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        },
        ProxyError::UpstreamData(_) | ProxyError::Malformed { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        AppError::Proxy(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
