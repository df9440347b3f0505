//! Read-only cache statistics
//!
//! - GET /api/cache/stats - entry count, hits, misses and hit rate per region

use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};

use crate::{cache::CacheStats, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(cache_stats))
}

async fn cache_stats(State(state): State<AppState>) -> Json<BTreeMap<&'static str, CacheStats>> {
    Json(state.proxy.cache().all_stats())
}
