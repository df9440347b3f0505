//! NASA API client
//!
//! Fetches raw JSON payloads from api.nasa.gov and images-api.nasa.gov. Every
//! call makes a single attempt with a fixed timeout; failures are returned as
//! `UpstreamError` for the degradation policy to classify.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::Value;

use super::{Endpoint, MediaType, Rover, UpstreamError};

/// Base URL for api.nasa.gov
pub const NASA_BASE_URL: &str = "https://api.nasa.gov";

/// Base URL for the Image and Video Library, which needs no API key
pub const NASA_IMAGES_BASE_URL: &str = "https://images-api.nasa.gov";

/// Results requested per media search
const SEARCH_PAGE_SIZE: u32 = 100;

/// Connection settings for the NASA APIs
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub api_key: String,
    pub base_url: String,
    pub images_base_url: String,
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_key: "DEMO_KEY".to_string(),
            base_url: NASA_BASE_URL.to_string(),
            images_base_url: NASA_IMAGES_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the NASA public APIs
#[derive(Debug, Clone)]
pub struct NasaClient {
    client: Client,
    api_key: String,
    base_url: String,
    images_base_url: String,
}

impl NasaClient {
    /// Creates a client with JSON headers and the configured timeout
    pub fn new(settings: UpstreamSettings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            images_base_url: settings.images_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Astronomy Picture of the Day, for `date` or the latest
    pub async fn apod(&self, date: Option<NaiveDate>) -> Result<Value, UpstreamError> {
        let mut params = vec![("thumbs", "true".to_string())];
        if let Some(date) = date {
            params.push(("date", date.to_string()));
        }
        self.get_keyed(Endpoint::Apod, "/planetary/apod", params).await
    }

    /// Every Astronomy Picture of the Day between `start` and `end` inclusive
    pub async fn apod_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Value, UpstreamError> {
        let params = vec![
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("thumbs", "true".to_string()),
        ];
        self.get_keyed(Endpoint::ApodRange, "/planetary/apod", params)
            .await
    }

    /// Photos taken by `rover` on martian day `sol`
    pub async fn mars_photos(
        &self,
        rover: Rover,
        sol: u32,
        camera: Option<&str>,
    ) -> Result<Value, UpstreamError> {
        let mut params = vec![("sol", sol.to_string())];
        if let Some(camera) = camera {
            params.push(("camera", camera.to_string()));
        }
        let path = format!("/mars-photos/api/v1/rovers/{}/photos", rover);
        self.get_keyed(Endpoint::MarsPhotos, &path, params).await
    }

    /// Mission manifest for `rover`
    pub async fn rover_manifest(&self, rover: Rover) -> Result<Value, UpstreamError> {
        let path = format!("/mars-photos/api/v1/manifests/{}", rover);
        self.get_keyed(Endpoint::RoverManifest, &path, Vec::new())
            .await
    }

    /// Near Earth Object feed between `start` and `end`
    pub async fn neo_feed(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, UpstreamError> {
        let params = vec![
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            ("detailed", "true".to_string()),
        ];
        self.get_keyed(Endpoint::Neo, "/neo/rest/v1/feed", params)
            .await
    }

    /// Details for a single asteroid
    pub async fn asteroid(&self, asteroid_id: &str) -> Result<Value, UpstreamError> {
        let path = format!("/neo/rest/v1/neo/{}", asteroid_id);
        self.get_keyed(Endpoint::AsteroidDetails, &path, Vec::new())
            .await
    }

    /// EPIC natural-color images for `date` or the latest available day
    ///
    /// Each returned item gains an `image_url` pointing at the archived PNG.
    pub async fn epic(&self, date: Option<NaiveDate>) -> Result<Value, UpstreamError> {
        let path = match date {
            Some(date) => format!("/EPIC/api/natural/date/{}", date),
            None => "/EPIC/api/natural".to_string(),
        };
        let mut data = self.get_keyed(Endpoint::Epic, &path, Vec::new()).await?;

        if let Value::Array(items) = &mut data {
            for item in items.iter_mut() {
                let url = match (
                    item.get("date").and_then(Value::as_str),
                    item.get("image").and_then(Value::as_str),
                ) {
                    (Some(date), Some(image)) => self.epic_image_url(date, image),
                    _ => None,
                };
                if let (Some(url), Some(fields)) = (url, item.as_object_mut()) {
                    fields.insert("image_url".to_string(), Value::String(url));
                }
            }
        }
        Ok(data)
    }

    /// Archive URL of an EPIC image, from its `YYYY-MM-DD hh:mm:ss` timestamp
    pub fn epic_image_url(&self, date: &str, image: &str) -> Option<String> {
        let day = date.split(' ').next()?;
        let mut parts = day.split('-');
        let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
        Some(format!(
            "{}/EPIC/archive/natural/{}/{}/{}/png/{}.png?api_key={}",
            self.base_url, year, month, day, image, self.api_key
        ))
    }

    /// Searches the Image and Video Library
    pub async fn search_media(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}/search", self.images_base_url);
        let params = vec![
            ("q", query.to_string()),
            ("media_type", media_type.as_str().to_string()),
            ("page_size", SEARCH_PAGE_SIZE.to_string()),
        ];
        let request = self.client.get(&url).query(&params);
        Self::into_json(Endpoint::ImageSearch, request.send().await).await
    }

    /// Asset manifest (every rendition) of a library item
    pub async fn media_assets(&self, nasa_id: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/asset/{}", self.images_base_url, nasa_id);
        let request = self.client.get(&url);
        Self::into_json(Endpoint::ImageAssets, request.send().await).await
    }

    /// GET against api.nasa.gov with the API key attached
    async fn get_keyed(
        &self,
        endpoint: Endpoint,
        path: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<Value, UpstreamError> {
        params.insert(0, ("api_key", self.api_key.clone()));
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.get(&url).query(&params);
        Self::into_json(endpoint, request.send().await).await
    }

    async fn into_json(
        endpoint: Endpoint,
        sent: Result<Response, reqwest::Error>,
    ) -> Result<Value, UpstreamError> {
        let response =
            sent.map_err(|source| UpstreamError::Unavailable { endpoint, source })?;
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body).or(reason);
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or("-"),
                "NASA API error"
            );
            return Err(UpstreamError::from_status(endpoint, status.as_u16(), detail));
        }

        response.json::<Value>().await.map_err(|source| {
            tracing::error!(endpoint = %endpoint, error = %source, "NASA API returned invalid JSON");
            UpstreamError::Decode { endpoint, source }
        })
    }
}

/// Pulls the API's own error description out of an error body
///
/// api.nasa.gov reports `{"msg": ...}` or `{"error_message": ...}` from the
/// individual services and `{"error": {"code", "message"}}` from its gateway.
fn error_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let text = |v: &Value| v.as_str().map(str::to_string);

    if let Some(msg) = json.get("msg").and_then(text) {
        return Some(msg);
    }
    if let Some(msg) = json.get("error_message").and_then(text) {
        return Some(msg);
    }
    match json.get("error")? {
        Value::String(msg) => Some(msg.clone()),
        Value::Object(error) => {
            let code = error.get("code").and_then(text);
            let message = error.get("message").and_then(text);
            match (code, message) {
                (Some(code), Some(message)) => Some(format!("{} {}", code, message)),
                (code, message) => code.or(message),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NasaClient {
        NasaClient::new(UpstreamSettings {
            api_key: "TEST_KEY".to_string(),
            base_url: server.uri(),
            images_base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .expect("client should build")
    }

    #[tokio::test]
    async fn test_apod_sends_key_date_and_thumbs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planetary/apod"))
            .and(query_param("api_key", "TEST_KEY"))
            .and(query_param("date", "2025-07-01"))
            .and(query_param("thumbs", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "title": "Sun" })))
            .expect(1)
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2025, 7, 1);
        let data = client_for(&server).apod(date).await.expect("should succeed");

        assert_eq!(data["title"], "Sun");
    }

    #[tokio::test]
    async fn test_rate_limited_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/planetary/apod"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": "OVER_RATE_LIMIT", "message": "You have exceeded your rate limit." }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).apod(None).await.unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert!(err.to_string().contains("rate limit exceeded"));
        assert!(err.status_text().unwrap().contains("OVER_RATE_LIMIT"));
    }

    #[tokio::test]
    async fn test_not_found_uses_upstream_msg_as_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/neo/rest/v1/neo/123"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "msg": "No asteroid" })))
            .mount(&server)
            .await;

        let err = client_for(&server).asteroid("123").await.unwrap_err();

        match err {
            UpstreamError::Status {
                status,
                message,
                detail,
                ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Asteroid Details: Requested data not found.");
                assert_eq!(detail.as_deref(), Some("No asteroid"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_reason_phrase() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mars-photos/api/v1/manifests/spirit"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .rover_manifest(Rover::Spirit)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Rover Manifest API Error (503): Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_unavailable() {
        let client = NasaClient::new(UpstreamSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            ..UpstreamSettings::default()
        })
        .expect("client should build");

        let err = client.apod(None).await.unwrap_err();

        assert!(matches!(err, UpstreamError::Unavailable { .. }));
        assert_eq!(err.status(), None);
        assert_eq!(
            err.to_string(),
            "APOD: Unable to reach NASA API. Please check your connection."
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_never_a_rate_limit() {
        let client = NasaClient::new(UpstreamSettings {
            api_key: "KEY429".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            ..UpstreamSettings::default()
        })
        .expect("client should build");

        let err = client.mars_photos(Rover::Curiosity, 429, None).await.unwrap_err();

        assert_eq!(err.status_text(), None);
        assert!(!crate::fallback::DegradationPolicy::default().is_degraded(&err));
    }

    #[tokio::test]
    async fn test_epic_items_gain_image_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/EPIC/api/natural/date/2025-06-30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "image": "epic_1b_20250630003633", "date": "2025-06-30 00:31:45" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let data = client
            .epic(NaiveDate::from_ymd_opt(2025, 6, 30))
            .await
            .expect("should succeed");

        assert_eq!(
            data[0]["image_url"],
            format!(
                "{}/EPIC/archive/natural/2025/06/30/png/epic_1b_20250630003633.png?api_key=TEST_KEY",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_search_uses_images_host_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "nebula"))
            .and(query_param("media_type", "video"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "collection": { "items": [] } })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client_for(&server)
            .search_media("nebula", MediaType::Video)
            .await
            .expect("should succeed");

        assert!(data["collection"]["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asset/PIA12348"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).media_assets("PIA12348").await.unwrap_err();

        assert!(matches!(err, UpstreamError::Decode { .. }));
    }

    #[test]
    fn test_error_detail_variants() {
        assert_eq!(error_detail(r#"{"msg":"bad date"}"#).as_deref(), Some("bad date"));
        assert_eq!(
            error_detail(r#"{"error_message":"nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(
            error_detail(r#"{"error":{"code":"API_KEY_INVALID","message":"bad key"}}"#).as_deref(),
            Some("API_KEY_INVALID bad key")
        );
        assert_eq!(error_detail("plain text"), None);
    }
}
