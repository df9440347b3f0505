//! Near Earth Object endpoints
//!
//! - GET /api/neo?start_date&end_date - feed summary, at most seven days
//! - GET /api/neo/{asteroid_id} - a single asteroid, passed through

use std::collections::BTreeMap;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

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

/// Longest range the feed API accepts, in days
const MAX_RANGE_DAYS: i64 = 7;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(feed))
        .route("/{asteroid_id}", get(asteroid))
        .route_layer(from_fn_with_state(
            state.upstream_limiter.clone(),
            limiter::enforce,
        ))
}

#[derive(Debug, Deserialize)]
struct FeedQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

// Raw feed, only the fields the summary reads

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default)]
    element_count: u64,
    #[serde(default)]
    links: Value,
    near_earth_objects: BTreeMap<String, Vec<Asteroid>>,
}

#[derive(Debug, Deserialize)]
struct Asteroid {
    id: String,
    name: String,
    #[serde(default)]
    nasa_jpl_url: Option<String>,
    #[serde(default)]
    is_potentially_hazardous_asteroid: bool,
    estimated_diameter: EstimatedDiameter,
    #[serde(default)]
    close_approach_data: Vec<CloseApproach>,
}

#[derive(Debug, Deserialize)]
struct EstimatedDiameter {
    meters: DiameterRange,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct DiameterRange {
    #[serde(rename(deserialize = "estimated_diameter_min"))]
    min: f64,
    #[serde(rename(deserialize = "estimated_diameter_max"))]
    max: f64,
}

#[derive(Debug, Deserialize)]
struct CloseApproach {
    #[serde(default)]
    close_approach_date_full: Option<String>,
    #[serde(default)]
    relative_velocity: Map<String, Value>,
    #[serde(default)]
    miss_distance: Map<String, Value>,
}

impl CloseApproach {
    fn miss_distance_km(&self) -> Option<f64> {
        numeric(self.miss_distance.get("kilometers"))
    }

    fn velocity_kmh(&self) -> Option<f64> {
        numeric(self.relative_velocity.get("kilometers_per_hour"))
    }
}

/// The API sends most measurements as decimal strings
fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

// Summary sent to clients

#[derive(Debug, Serialize)]
struct FeedSummary {
    element_count: u64,
    links: Value,
    start_date: String,
    end_date: String,
    asteroids_by_date: BTreeMap<String, Vec<AsteroidSummary>>,
    potentially_hazardous_count: usize,
    closest_approach: Option<ClosestApproach>,
    largest_asteroid: Option<LargestAsteroid>,
}

#[derive(Debug, Serialize)]
struct AsteroidSummary {
    id: String,
    name: String,
    nasa_jpl_url: Option<String>,
    is_potentially_hazardous: bool,
    diameter_meters: DiameterRange,
    close_approach: Option<ApproachSummary>,
}

#[derive(Debug, Serialize)]
struct ApproachSummary {
    date: Option<String>,
    miss_distance_km: Option<f64>,
    velocity_kmh: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct ClosestApproach {
    name: String,
    date: Option<String>,
    miss_distance: Map<String, Value>,
    velocity: Map<String, Value>,
    #[serde(skip)]
    kilometers: f64,
}

#[derive(Debug, Clone, Serialize)]
struct LargestAsteroid {
    name: String,
    diameter: f64,
    is_hazardous: bool,
}

fn summarize(feed: Feed, start: NaiveDate, end: NaiveDate) -> FeedSummary {
    let mut summary = FeedSummary {
        element_count: feed.element_count,
        links: feed.links,
        start_date: start.to_string(),
        end_date: end.to_string(),
        asteroids_by_date: BTreeMap::new(),
        potentially_hazardous_count: 0,
        closest_approach: None,
        largest_asteroid: None,
    };

    for (date, asteroids) in feed.near_earth_objects {
        let mut day = Vec::with_capacity(asteroids.len());
        for asteroid in asteroids {
            let diameter = asteroid.estimated_diameter.meters;
            let approach = asteroid.close_approach_data.into_iter().next();

            if asteroid.is_potentially_hazardous_asteroid {
                summary.potentially_hazardous_count += 1;
            }

            if let Some((approach, km)) = approach
                .as_ref()
                .and_then(|a| a.miss_distance_km().map(|km| (a, km)))
            {
                let closer = summary
                    .closest_approach
                    .as_ref()
                    .map_or(true, |closest| km < closest.kilometers);
                if closer {
                    summary.closest_approach = Some(ClosestApproach {
                        name: asteroid.name.clone(),
                        date: approach.close_approach_date_full.clone(),
                        miss_distance: approach.miss_distance.clone(),
                        velocity: approach.relative_velocity.clone(),
                        kilometers: km,
                    });
                }
            }

            let larger = summary
                .largest_asteroid
                .as_ref()
                .map_or(true, |largest| diameter.max > largest.diameter);
            if larger {
                summary.largest_asteroid = Some(LargestAsteroid {
                    name: asteroid.name.clone(),
                    diameter: diameter.max,
                    is_hazardous: asteroid.is_potentially_hazardous_asteroid,
                });
            }

            day.push(AsteroidSummary {
                id: asteroid.id,
                name: asteroid.name,
                nasa_jpl_url: asteroid.nasa_jpl_url,
                is_potentially_hazardous: asteroid.is_potentially_hazardous_asteroid,
                diameter_meters: diameter,
                close_approach: approach.map(|a| ApproachSummary {
                    miss_distance_km: a.miss_distance_km(),
                    velocity_kmh: a.velocity_kmh(),
                    date: a.close_approach_date_full,
                }),
            });
        }
        summary.asteroids_by_date.insert(date, day);
    }

    summary
}

fn reshape_feed(raw: Value, start: NaiveDate, end: NaiveDate) -> Result<Value, ProxyError> {
    let feed: Feed =
        serde_json::from_value(raw).map_err(|err| ProxyError::malformed(Endpoint::Neo, err))?;
    serde_json::to_value(summarize(feed, start, end))
        .map_err(|err| ProxyError::malformed(Endpoint::Neo, err))
}

async fn feed(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Value>, AppError> {
    let today = Utc::now().date_naive();
    let start = validate::optional_date(query.start_date.as_deref())?.unwrap_or(today);
    let end = validate::optional_date(query.end_date.as_deref())?
        .unwrap_or(today + Duration::days(MAX_RANGE_DAYS));
    validate::ordered_range(start, end)?;
    if (end - start).num_days() > MAX_RANGE_DAYS {
        return Err(AppError::Validation(
            "Date range cannot exceed 7 days".to_string(),
        ));
    }

    let body = state
        .proxy
        .serve(
            Region::NearEarthObjects,
            CacheKey::from_uri(&uri),
            FallbackRequest::NearEarthObjects,
            state.client.neo_feed(start, end),
            |raw| reshape_feed(raw, start, end),
        )
        .await?;
    Ok(Json(body))
}

async fn asteroid(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(asteroid_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if asteroid_id.is_empty() || !asteroid_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation("Invalid asteroid ID".to_string()));
    }

    let body = state
        .proxy
        .serve(
            Region::NearEarthObjects,
            CacheKey::from_uri(&uri),
            FallbackRequest::Unavailable,
            state.client.asteroid(&asteroid_id),
            Ok,
        )
        .await?;
    Ok(Json(body))
}
