//! Image and Video Library endpoints
//!
//! - GET /api/search?q&media_type&page - flattened results, 20 per page
//! - GET /api/search/asset/{nasa_id} - renditions of one item, largest first

use axum::{
    extract::{OriginalUri, Path, Query, State},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validate;
use crate::{
    cache::{CacheKey, Region},
    error::AppError,
    fallback::FallbackRequest,
    limiter,
    proxy::ProxyError,
    state::AppState,
    upstream::{Endpoint, MediaType},
};

const RESULTS_PER_PAGE: usize = 20;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/asset/{nasa_id}", get(asset))
        .route_layer(from_fn_with_state(
            state.upstream_limiter.clone(),
            limiter::enforce,
        ))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
    media_type: Option<String>,
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    collection: Collection,
}

#[derive(Debug, Deserialize)]
struct Collection {
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    total_hits: u64,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    data: Vec<ItemData>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct ItemData {
    nasa_id: String,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<Vec<String>>,
    date_created: Option<String>,
    center: Option<String>,
    media_type: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: Option<String>,
}

/// One search hit as sent to clients
#[derive(Debug, Serialize)]
struct SearchResult {
    nasa_id: String,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<Vec<String>>,
    date_created: Option<String>,
    center: Option<String>,
    media_type: Option<String>,
    thumbnail: Option<String>,
    location: Option<String>,
}

impl Item {
    /// Flattens the item's first metadata record; `None` when it has none
    fn into_result(self) -> Option<SearchResult> {
        let thumbnail = self
            .links
            .into_iter()
            .find(|link| link.rel.as_deref() == Some("preview"))
            .map(|link| link.href);
        let info = self.data.into_iter().next()?;

        Some(SearchResult {
            nasa_id: info.nasa_id,
            title: info.title,
            description: info.description,
            keywords: info.keywords,
            date_created: info.date_created,
            center: info.center,
            media_type: info.media_type,
            thumbnail,
            location: info.location,
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchPage<'a> {
    query: &'a str,
    media_type: MediaType,
    total_hits: u64,
    page: usize,
    total_pages: usize,
    results: &'a [SearchResult],
}

fn paginate_results(
    raw: Value,
    query: &str,
    media_type: MediaType,
    page: usize,
) -> Result<Value, ProxyError> {
    let response: SearchResponse = serde_json::from_value(raw)
        .map_err(|err| ProxyError::malformed(Endpoint::ImageSearch, err))?;
    let collection = response.collection;
    let results: Vec<SearchResult> = collection
        .items
        .into_iter()
        .filter_map(Item::into_result)
        .collect();
    let total_hits = collection
        .metadata
        .map_or(results.len() as u64, |m| m.total_hits);

    serde_json::to_value(SearchPage {
        query,
        media_type,
        total_hits,
        page,
        total_pages: validate::total_pages(results.len(), RESULTS_PER_PAGE),
        results: validate::page_slice(&results, page, RESULTS_PER_PAGE),
    })
    .map_err(|err| ProxyError::malformed(Endpoint::ImageSearch, err))
}

async fn search(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(AppError::Validation(
            "Search query (q) is required".to_string(),
        ));
    }
    let media_type = validate::parse_media_type(params.media_type.as_deref())?;
    let page = validate::parse_page(params.page.as_deref())?;

    let body = state
        .proxy
        .serve(
            Region::MediaSearch,
            CacheKey::from_uri(&uri),
            FallbackRequest::MediaSearch,
            state.client.search_media(query, media_type),
            |raw| paginate_results(raw, query, media_type, page),
        )
        .await?;
    Ok(Json(body))
}

/// Rendition size, in display priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
enum AssetSize {
    Original,
    Large,
    Medium,
    Small,
    Thumbnail,
    Unknown,
}

impl AssetSize {
    fn from_href(href: &str) -> Self {
        [
            ("~orig", AssetSize::Original),
            ("~large", AssetSize::Large),
            ("~medium", AssetSize::Medium),
            ("~small", AssetSize::Small),
            ("~thumb", AssetSize::Thumbnail),
        ]
        .into_iter()
        .find(|(suffix, _)| href.contains(suffix))
        .map_or(AssetSize::Unknown, |(_, size)| size)
    }
}

#[derive(Debug, Deserialize)]
struct AssetManifest {
    collection: AssetCollection,
}

#[derive(Debug, Deserialize)]
struct AssetCollection {
    #[serde(default)]
    items: Vec<AssetLink>,
}

#[derive(Debug, Deserialize)]
struct AssetLink {
    href: String,
}

#[derive(Debug, Serialize)]
struct Asset {
    href: String,
    title: String,
    size: AssetSize,
}

#[derive(Debug, Serialize)]
struct AssetList<'a> {
    nasa_id: &'a str,
    assets: Vec<Asset>,
}

fn classify_assets(raw: Value, nasa_id: &str) -> Result<Value, ProxyError> {
    let manifest: AssetManifest = serde_json::from_value(raw)
        .map_err(|err| ProxyError::malformed(Endpoint::ImageAssets, err))?;

    let mut assets: Vec<Asset> = manifest
        .collection
        .items
        .into_iter()
        .map(|link| Asset {
            title: link.href.rsplit('/').next().unwrap_or_default().to_string(),
            size: AssetSize::from_href(&link.href),
            href: link.href,
        })
        .collect();
    assets.sort_by_key(|asset| asset.size);

    serde_json::to_value(AssetList { nasa_id, assets })
        .map_err(|err| ProxyError::malformed(Endpoint::ImageAssets, err))
}

async fn asset(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(nasa_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if nasa_id.trim().is_empty() {
        return Err(AppError::Validation("NASA ID is required".to_string()));
    }

    let body = state
        .proxy
        .serve(
            Region::MediaSearch,
            CacheKey::from_uri(&uri),
            FallbackRequest::Unavailable,
            state.client.media_assets(&nasa_id),
            |raw| classify_assets(raw, &nasa_id),
        )
        .await?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::canned;
    use serde_json::json;

    fn hits(n: usize) -> Value {
        let items: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "data": [{ "nasa_id": format!("ID{}", i), "title": "t" }],
                    "links": [
                        { "href": "https://x/orig.jpg", "rel": "canonical" },
                        { "href": format!("https://x/{}~thumb.jpg", i), "rel": "preview" }
                    ]
                })
            })
            .collect();
        json!({ "collection": { "items": items, "metadata": { "total_hits": 1234 } } })
    }

    #[test]
    fn test_results_are_flattened_and_paged() {
        let body = paginate_results(hits(45), "moon", MediaType::Image, 3).unwrap();

        assert_eq!(body["total_hits"], 1234);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["page"], 3);
        assert_eq!(body["media_type"], "image");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0]["nasa_id"], "ID40");
        assert_eq!(results[0]["thumbnail"], "https://x/40~thumb.jpg");
    }

    #[test]
    fn test_bundled_results_count_items_without_metadata() {
        let body = paginate_results(canned::media_search(), "hubble", MediaType::Image, 1).unwrap();

        assert_eq!(body["total_hits"], 1);
        assert_eq!(body["query"], "hubble");
        assert_eq!(body["results"][0]["nasa_id"], "PIA12348");
    }

    #[test]
    fn test_items_without_data_are_skipped() {
        let raw = json!({ "collection": { "items": [{ "links": [] }] } });

        let body = paginate_results(raw, "x", MediaType::Audio, 1).unwrap();

        assert_eq!(body["total_hits"], 0);
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_assets_sorted_by_size() {
        let raw = json!({ "collection": { "items": [
            { "href": "https://a/PIA1~thumb.jpg" },
            { "href": "https://a/metadata.json" },
            { "href": "https://a/PIA1~orig.tif" },
            { "href": "https://a/PIA1~medium.jpg" }
        ]}});

        let body = classify_assets(raw, "PIA1").unwrap();

        let sizes: Vec<&str> = body["assets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["size"].as_str().unwrap())
            .collect();
        assert_eq!(sizes, ["original", "medium", "thumbnail", "unknown"]);
        assert_eq!(body["assets"][0]["title"], "PIA1~orig.tif");
        assert_eq!(body["nasa_id"], "PIA1");
    }
}
