//! Astronomy Picture of the Day endpoints
//!
//! - GET /api/apod?date - one picture, for `date` or today
//! - GET /api/apod/range?start_date&end_date - every picture in a range
//! - GET /api/apod/random - a picture from a random day since the archive began

use axum::{
    extract::{OriginalUri, Query, State},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use super::validate;
use crate::{
    cache::{CacheKey, Region},
    error::AppError,
    fallback::FallbackRequest,
    limiter,
    state::AppState,
};

/// First day of the APOD archive
fn archive_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 6, 16).unwrap_or_default()
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(apod))
        .route("/range", get(apod_range))
        .route("/random", get(random_apod))
        .route_layer(from_fn_with_state(
            state.upstream_limiter.clone(),
            limiter::enforce,
        ))
}

#[derive(Debug, Deserialize)]
struct DateQuery {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn apod(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let date = validate::optional_date(query.date.as_deref())?;
    serve_date(&state, CacheKey::from_uri(&uri), date).await
}

async fn apod_range(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>, AppError> {
    let (Some(start), Some(end)) = (
        query.start_date.as_deref().filter(|v| !v.is_empty()),
        query.end_date.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Both start_date and end_date are required".to_string(),
        ));
    };
    let start = validate::parse_date(start)?;
    let end = validate::parse_date(end)?;
    validate::ordered_range(start, end)?;
    validate::range_within(start, end, archive_start(), Utc::now().date_naive())?;

    let body = state
        .proxy
        .serve(
            Region::DailyImage,
            CacheKey::from_uri(&uri),
            FallbackRequest::DailyImageRange { start, end },
            state.client.apod_range(start, end),
            Ok,
        )
        .await?;
    Ok(Json(body))
}

/// Serves a random day, cached under the same key as a request for that date
async fn random_apod(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let date = random_date(Utc::now().date_naive());
    let key = CacheKey::new("/api/apod", Some(&format!("date={}", date)));
    serve_date(&state, key, Some(date)).await
}

async fn serve_date(
    state: &AppState,
    key: CacheKey,
    date: Option<NaiveDate>,
) -> Result<Json<Value>, AppError> {
    let body = state
        .proxy
        .serve(
            Region::DailyImage,
            key,
            FallbackRequest::DailyImage { date },
            state.client.apod(date),
            Ok,
        )
        .await?;
    Ok(Json(body))
}

fn random_date(today: NaiveDate) -> NaiveDate {
    let start = archive_start();
    let span = (today - start).num_days().max(0);
    let offset = rand::thread_rng().gen_range(0..=span);
    start + chrono::Duration::days(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_date_stays_in_archive() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        for _ in 0..200 {
            let date = random_date(today);
            assert!(date >= archive_start() && date <= today, "{} out of range", date);
        }
    }

    #[test]
    fn test_random_date_on_first_day() {
        assert_eq!(random_date(archive_start()), archive_start());
    }
}
