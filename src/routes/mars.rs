//! Mars rover endpoints
//!
//! - GET /api/mars?sol&camera&rover&page - rover photos, 25 per page
//! - GET /api/mars/manifest/{rover} - mission manifest
//! - GET /api/mars/cameras/{rover} - the rover's cameras (static, not limited)

use axum::{
    extract::{OriginalUri, Path, Query, State},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
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
    upstream::{Endpoint, Rover},
};

const PHOTOS_PER_PAGE: usize = 25;

/// One camera mounted on a rover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Camera {
    pub abbrev: &'static str,
    pub name: &'static str,
}

const fn camera(abbrev: &'static str, name: &'static str) -> Camera {
    Camera { abbrev, name }
}

pub static CURIOSITY_CAMERAS: [Camera; 7] = [
    camera("FHAZ", "Front Hazard Avoidance Camera"),
    camera("RHAZ", "Rear Hazard Avoidance Camera"),
    camera("MAST", "Mast Camera"),
    camera("CHEMCAM", "Chemistry and Camera Complex"),
    camera("MAHLI", "Mars Hand Lens Imager"),
    camera("MARDI", "Mars Descent Imager"),
    camera("NAVCAM", "Navigation Camera"),
];

/// Shared by the two Mars Exploration Rovers
pub static MER_CAMERAS: [Camera; 5] = [
    camera("FHAZ", "Front Hazard Avoidance Camera"),
    camera("RHAZ", "Rear Hazard Avoidance Camera"),
    camera("NAVCAM", "Navigation Camera"),
    camera("PANCAM", "Panoramic Camera"),
    camera("MINITES", "Miniature Thermal Emission Spectrometer"),
];

pub static PERSEVERANCE_CAMERAS: [Camera; 13] = [
    camera("EDL_RUCAM", "Rover Up-Look Camera"),
    camera("EDL_RDCAM", "Rover Down-Look Camera"),
    camera("EDL_DDCAM", "Descent Stage Down-Look Camera"),
    camera("EDL_PUCAM1", "Parachute Up-Look Camera A"),
    camera("EDL_PUCAM2", "Parachute Up-Look Camera B"),
    camera("NAVCAM_LEFT", "Navigation Camera - Left"),
    camera("NAVCAM_RIGHT", "Navigation Camera - Right"),
    camera("MCZ_LEFT", "Mast Camera Zoom - Left"),
    camera("MCZ_RIGHT", "Mast Camera Zoom - Right"),
    camera("FRONT_HAZCAM_LEFT_A", "Front Hazard Avoidance Camera - Left"),
    camera("FRONT_HAZCAM_RIGHT_A", "Front Hazard Avoidance Camera - Right"),
    camera("REAR_HAZCAM_LEFT", "Rear Hazard Avoidance Camera - Left"),
    camera("REAR_HAZCAM_RIGHT", "Rear Hazard Avoidance Camera - Right"),
];

pub fn cameras_for(rover: Rover) -> &'static [Camera] {
    match rover {
        Rover::Curiosity => &CURIOSITY_CAMERAS,
        Rover::Opportunity | Rover::Spirit => &MER_CAMERAS,
        Rover::Perseverance => &PERSEVERANCE_CAMERAS,
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(photos))
        .route("/manifest/{rover}", get(manifest))
        .route_layer(from_fn_with_state(
            state.upstream_limiter.clone(),
            limiter::enforce,
        ))
        .route("/cameras/{rover}", get(cameras))
}

#[derive(Debug, Deserialize)]
struct PhotosQuery {
    sol: Option<String>,
    camera: Option<String>,
    rover: Option<String>,
    page: Option<String>,
}

async fn photos(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PhotosQuery>,
) -> Result<Json<Value>, AppError> {
    let sol = validate::parse_sol(query.sol.as_deref())?;
    let rover = validate::parse_rover(query.rover.as_deref())?;
    let page = validate::parse_page(query.page.as_deref())?;
    let camera = query.camera.filter(|c| !c.is_empty());

    let body = state
        .proxy
        .serve(
            Region::RoverPhotos,
            CacheKey::from_uri(&uri),
            FallbackRequest::RoverPhotos,
            state.client.mars_photos(rover, sol, camera.as_deref()),
            |raw| paginate_photos(raw, rover, sol, camera.as_deref(), page),
        )
        .await?;
    Ok(Json(body))
}

fn paginate_photos(
    raw: Value,
    rover: Rover,
    sol: u32,
    camera: Option<&str>,
    page: usize,
) -> Result<Value, ProxyError> {
    let photos = raw
        .get("photos")
        .and_then(Value::as_array)
        .ok_or_else(|| ProxyError::malformed(Endpoint::MarsPhotos, "missing photos array"))?;
    let total = photos.len();

    Ok(json!({
        "photos": validate::page_slice(photos, page, PHOTOS_PER_PAGE),
        "total": total,
        "page": page,
        "totalPages": validate::total_pages(total, PHOTOS_PER_PAGE),
        "sol": sol,
        "rover": rover,
        "camera": camera,
    }))
}

async fn manifest(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(rover): Path<String>,
) -> Result<Json<Value>, AppError> {
    let rover = validate::parse_rover(Some(&rover))?;

    let body = state
        .proxy
        .serve(
            Region::RoverPhotos,
            CacheKey::from_uri(&uri),
            FallbackRequest::RoverManifest,
            state.client.rover_manifest(rover),
            Ok,
        )
        .await?;
    Ok(Json(body))
}

async fn cameras(Path(rover): Path<String>) -> Result<Json<Value>, AppError> {
    let rover: Rover = rover
        .parse()
        .map_err(|_| AppError::Validation("Invalid rover name".to_string()))?;

    Ok(Json(json!({
        "rover": rover,
        "cameras": cameras_for(rover),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Value {
        let photos: Vec<Value> = (0..n).map(|id| json!({ "id": id })).collect();
        json!({ "photos": photos })
    }

    #[test]
    fn test_second_page_holds_the_remainder() {
        let body = paginate_photos(photos(30), Rover::Curiosity, 1000, None, 2).unwrap();

        assert_eq!(body["total"], 30);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["photos"].as_array().unwrap().len(), 5);
        assert_eq!(body["photos"][0]["id"], 25);
        assert_eq!(body["rover"], "curiosity");
        assert_eq!(body["camera"], Value::Null);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let body = paginate_photos(photos(3), Rover::Spirit, 5, Some("NAVCAM"), 4).unwrap();

        assert!(body["photos"].as_array().unwrap().is_empty());
        assert_eq!(body["page"], 4);
        assert_eq!(body["camera"], "NAVCAM");
    }

    #[test]
    fn test_missing_photos_is_malformed() {
        let err = paginate_photos(json!({}), Rover::Curiosity, 1, None, 1).unwrap_err();

        assert!(matches!(err, ProxyError::Malformed { .. }));
    }

    #[test]
    fn test_every_rover_has_cameras() {
        for rover in Rover::ALL {
            assert!(!cameras_for(rover).is_empty(), "{} has no cameras", rover);
        }
        assert_eq!(cameras_for(Rover::Perseverance).len(), 13);
    }
}
