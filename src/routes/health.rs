//! Liveness endpoint; the proxy has no dependencies worth probing.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{error::timestamp, state::AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
    environment: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: timestamp(),
        environment: state.config.environment.clone(),
    })
}
