//! HTTP surface
//!
//! Every category lives under `/api` behind the general rate limiter; routes
//! that may reach the NASA API additionally sit behind the upstream limiter.
//! Handlers validate their parameters, then hand the upstream call and a
//! reshaping function to `Proxy::serve`.

mod admin;
mod apod;
mod epic;
mod health;
mod mars;
mod neo;
mod search;
pub mod validate;

use std::any::Any;

use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, RETRY_AFTER},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware::{from_fn_with_state, map_response},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{AppError, InternalErrorDetail},
    limiter,
    state::AppState,
};

/// Builds the full application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/apod", apod::router(&state))
        .nest("/mars", mars::router(&state))
        .nest("/neo", neo::router(&state))
        .nest("/epic", epic::router(&state))
        .nest("/search", search::router(&state))
        .nest("/cache", admin::router())
        .layer(from_fn_with_state(
            state.general_limiter.clone(),
            limiter::enforce,
        ));

    let router = Router::new()
        .nest("/api", api)
        .route("/health", get(health::health_check))
        .fallback(not_found)
        .with_state(state.clone())
        .layer(cors(&state.config))
        .layer(TraceLayer::new_for_http());

    with_error_boundary(router, state.config.is_production())
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([
            RETRY_AFTER,
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
            HeaderName::from_static("x-upstream-ratelimit-limit"),
            HeaderName::from_static("x-upstream-ratelimit-remaining"),
            HeaderName::from_static("x-upstream-ratelimit-reset"),
        ])
}

/// Turns handler panics into 500 responses; outside production the error
/// detail is copied into the body
fn with_error_boundary(router: Router, production: bool) -> Router {
    let router = router.layer(CatchPanicLayer::custom(handle_panic));
    if production {
        router
    } else {
        router.layer(map_response(expose_internal_detail))
    }
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

async fn expose_internal_detail(response: Response) -> Response {
    let detail = response.extensions().get::<InternalErrorDetail>().cloned();
    let Some(InternalErrorDetail(detail)) = detail else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let mut payload = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    };
    if !payload.is_object() {
        payload = json!({ "error": "Internal Server Error" });
    }
    payload["detail"] = Value::String(detail);

    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(payload.to_string()))
}

async fn not_found(request: Request) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": format!("Cannot {} {}", request.method(), request.uri()),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("lost the cache")
    }

    fn panicking_router(production: bool) -> Router {
        with_error_boundary(Router::new().route("/boom", get(boom)), production)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_panic_detail_shown_outside_production() {
        let (status, body) = get_json(panicking_router(false), "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
        assert!(body["detail"].as_str().unwrap().contains("lost the cache"));
    }

    #[tokio::test]
    async fn test_panic_detail_hidden_in_production() {
        let (status, body) = get_json(panicking_router(true), "/boom").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("detail").is_none());
        assert!(!body.to_string().contains("lost the cache"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let router = Router::new().fallback(not_found);

        let (status, body) = get_json(router, "/api/jupiter").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "Cannot GET /api/jupiter");
    }
}
