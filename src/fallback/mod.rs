//! Degradation policy and bundled fallback data
//!
//! When the NASA API rate limits us, requests are answered with bundled data
//! shaped exactly like a live response, so reshaping code never needs to know
//! where a payload came from. Every substituted payload carries the
//! `_isFallbackData: true` marker so clients can label it as sample data.

pub mod apod;
pub mod canned;
mod policy;

pub use policy::{DegradationPolicy, DEFAULT_RATE_LIMIT_PATTERNS};

use chrono::NaiveDate;
use serde_json::Value;

/// Field added to every substituted payload
pub const FALLBACK_MARKER: &str = "_isFallbackData";

/// What a request asked for, as far as fallback selection is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRequest {
    /// A single daily image, for a date or for today
    DailyImage { date: Option<NaiveDate> },
    /// One daily image per calendar day, inclusive
    DailyImageRange { start: NaiveDate, end: NaiveDate },
    RoverPhotos,
    RoverManifest,
    NearEarthObjects,
    MediaSearch,
    /// No bundled data exists; a rate limit must propagate
    Unavailable,
}

impl FallbackRequest {
    /// Selects the marked substitute payload, or `None` when nothing is bundled
    pub fn select(self, today: NaiveDate) -> Option<Value> {
        let payload = match self {
            FallbackRequest::DailyImage { date } => apod_value(date, today),
            FallbackRequest::DailyImageRange { start, end } => Value::Array(
                start
                    .iter_days()
                    .take_while(|day| *day <= end)
                    .map(|day| apod_value(Some(day), today))
                    .collect(),
            ),
            FallbackRequest::RoverPhotos => canned::rover_photos(),
            FallbackRequest::RoverManifest => canned::rover_manifest(),
            FallbackRequest::NearEarthObjects => canned::neo_feed(),
            FallbackRequest::MediaSearch => canned::media_search(),
            FallbackRequest::Unavailable => return None,
        };
        Some(mark(payload))
    }
}

fn apod_value(date: Option<NaiveDate>, today: NaiveDate) -> Value {
    // ApodEntry holds only strings, so serialization cannot fail.
    serde_json::to_value(apod::resolve(date, today)).unwrap_or(Value::Null)
}

/// Adds the fallback marker to an object, or to every object in an array
pub fn mark(mut payload: Value) -> Value {
    match &mut payload {
        Value::Object(fields) => {
            fields.insert(FALLBACK_MARKER.to_string(), Value::Bool(true));
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                if let Value::Object(fields) = item {
                    fields.insert(FALLBACK_MARKER.to_string(), Value::Bool(true));
                }
            }
        }
        _ => {}
    }
    payload
}

/// Whether a payload carries the fallback marker
pub fn is_marked(payload: &Value) -> bool {
    payload.get(FALLBACK_MARKER).and_then(Value::as_bool) == Some(true)
}
