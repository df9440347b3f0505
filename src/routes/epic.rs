//! Earth Polychromatic Imaging Camera endpoints
//!
//! - GET /api/epic?date - natural-color images for a day, or the latest
//! - GET /api/epic/dates - static information about the archive

use axum::{
    extract::{OriginalUri, Query, State},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::validate;
use crate::{
    cache::{CacheKey, Region},
    error::AppError,
    fallback::FallbackRequest,
    limiter,
    proxy::ProxyError,
    state::AppState,
    upstream::Endpoint,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(images))
        .route_layer(from_fn_with_state(
            state.upstream_limiter.clone(),
            limiter::enforce,
        ))
        .route("/dates", get(dates))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<String>,
}

async fn images(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let date = validate::optional_date(query.date.as_deref())?;

    let body = state
        .proxy
        .serve(
            Region::EarthImagery,
            CacheKey::from_uri(&uri),
            FallbackRequest::Unavailable,
            state.client.epic(date),
            |raw| wrap_images(raw, date),
        )
        .await?;
    Ok(Json(body))
}

fn wrap_images(raw: Value, date: Option<NaiveDate>) -> Result<Value, ProxyError> {
    let Value::Array(images) = raw else {
        return Err(ProxyError::malformed(Endpoint::Epic, "expected an array of images"));
    };

    let Some(first) = images.first() else {
        return Ok(json!({
            "message": "No images available for this date",
            "date": date.map_or_else(|| "latest".to_string(), |d| d.to_string()),
            "images": [],
        }));
    };

    let date = match date {
        Some(date) => Value::String(date.to_string()),
        None => first.get("date").cloned().unwrap_or(Value::Null),
    };
    Ok(json!({
        "date": date,
        "image_count": images.len(),
        "images": images,
    }))
}

#[derive(Debug, Serialize)]
struct ArchiveInfo {
    info: &'static str,
    first_available: &'static str,
    update_frequency: &'static str,
    typical_images_per_day: &'static str,
    note: &'static str,
}

static ARCHIVE_INFO: ArchiveInfo = ArchiveInfo {
    info: "EPIC provides daily images of Earth since 2015",
    first_available: "2015-09-01",
    update_frequency: "Daily (when operational)",
    typical_images_per_day: "12-24",
    note: "Use /api/epic?date=YYYY-MM-DD to get images for a specific date",
};

async fn dates() -> Json<&'static ArchiveInfo> {
    Json(&ARCHIVE_INFO)
}
