//! Cache-first upstream access with rate-limit degradation
//!
//! `Proxy::serve` is the single path every NASA-backed route goes through:
//!
//! 1. a fresh cached body for the canonical key is returned as is
//! 2. otherwise the upstream is called once; a successful body is reshaped,
//!    cached and returned
//! 3. a failure classified as a rate limit is answered with bundled data,
//!    reshaped like a live body and marked, and is never cached
//! 4. any other failure propagates
//!
//! Two concurrent misses for the same key both reach the upstream and the last
//! write wins.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::cache::{CacheKey, Region, ResponseCache};
use crate::fallback::{self, DegradationPolicy, FallbackRequest};
use crate::upstream::{Endpoint, UpstreamError};

/// Failures that reach the HTTP boundary
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The API is rate limiting us and nothing is bundled for this category
    #[error("{endpoint}: NASA API rate limit exceeded. Please try again later.")]
    UpstreamRateLimited { endpoint: Endpoint },

    /// No response from the API
    #[error(transparent)]
    UpstreamUnavailable(UpstreamError),

    /// The API answered with an error status or an unreadable body
    #[error(transparent)]
    UpstreamData(UpstreamError),

    /// The body parsed as JSON but not in the shape the route expects
    #[error("{endpoint}: Unexpected response from NASA API: {detail}")]
    Malformed { endpoint: Endpoint, detail: String },
}

impl ProxyError {
    pub fn malformed(endpoint: Endpoint, detail: impl ToString) -> Self {
        ProxyError::Malformed {
            endpoint,
            detail: detail.to_string(),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            ProxyError::UpstreamRateLimited { endpoint } | ProxyError::Malformed { endpoint, .. } => {
                *endpoint
            }
            ProxyError::UpstreamUnavailable(err) | ProxyError::UpstreamData(err) => err.endpoint(),
        }
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unavailable { .. } => ProxyError::UpstreamUnavailable(err),
            UpstreamError::Status { .. } | UpstreamError::Decode { .. } => {
                ProxyError::UpstreamData(err)
            }
        }
    }
}

/// Response cache composed with the degradation policy
#[derive(Debug)]
pub struct Proxy {
    cache: Arc<ResponseCache>,
    policy: DegradationPolicy,
}

impl Proxy {
    pub fn new(cache: Arc<ResponseCache>, policy: DegradationPolicy) -> Self {
        Self { cache, policy }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Serves `key` from `region`, calling `fetch` only on a cache miss
    ///
    /// `fetch` is a not-yet-polled upstream call; it is dropped untouched on a
    /// hit. `reshape` turns a raw API payload (live or bundled) into the body
    /// sent to clients.
    pub async fn serve<Fut, R>(
        &self,
        region: Region,
        key: CacheKey,
        fallback: FallbackRequest,
        fetch: Fut,
        reshape: R,
    ) -> Result<Value, ProxyError>
    where
        Fut: Future<Output = Result<Value, UpstreamError>>,
        R: FnOnce(Value) -> Result<Value, ProxyError>,
    {
        if let Some(cached) = self.cache.get(region, &key) {
            return Ok(cached);
        }

        match fetch.await {
            Ok(raw) => {
                let body = reshape(raw)?;
                self.cache.put(region, key, body.clone());
                Ok(body)
            }
            Err(err) if self.policy.is_degraded(&err) => {
                let endpoint = err.endpoint();
                let today = Utc::now().date_naive();
                match fallback.select(today) {
                    Some(substitute) => {
                        tracing::warn!(
                            endpoint = %endpoint,
                            region = %region,
                            key = %key,
                            "NASA API rate limited, serving fallback data"
                        );
                        Ok(fallback::mark(reshape(substitute)?))
                    }
                    None => {
                        tracing::warn!(
                            endpoint = %endpoint,
                            region = %region,
                            "NASA API rate limited, no fallback data bundled"
                        );
                        Err(ProxyError::UpstreamRateLimited { endpoint })
                    }
                }
            }
            Err(err) => {
                tracing::warn!(region = %region, key = %key, error = %err, "upstream request failed");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::is_marked;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts upstream calls and answers with a scripted result
    struct FakeUpstream {
        calls: AtomicUsize,
        status: Option<u16>,
    }

    impl FakeUpstream {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                status: Some(status),
            }
        }

        async fn fetch(&self) -> Result<Value, UpstreamError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.status {
                None => Ok(json!({ "date": "2024-01-01", "title": "live", "call": n })),
                Some(status) => Err(UpstreamError::from_status(Endpoint::Apod, status, None)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn proxy() -> Proxy {
        Proxy::new(Arc::new(ResponseCache::new()), DegradationPolicy::default())
    }

    fn apod_key(date: &str) -> CacheKey {
        CacheKey::new("/api/apod", Some(&format!("date={}", date)))
    }

    fn apod_fallback(date: &str) -> FallbackRequest {
        FallbackRequest::DailyImage {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        }
    }

    async fn serve_apod(proxy: &Proxy, upstream: &FakeUpstream, date: &str) -> Result<Value, ProxyError> {
        proxy
            .serve(
                Region::DailyImage,
                apod_key(date),
                apod_fallback(date),
                upstream.fetch(),
                Ok,
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_request_is_served_from_cache() {
        let proxy = proxy();
        let upstream = FakeUpstream::ok();

        let first = serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();
        let second = serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();

        assert_eq!(upstream.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_triggers_fresh_fetch() {
        let proxy = proxy();
        let upstream = FakeUpstream::ok();

        serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();
        tokio::time::advance(Region::DailyImage.ttl() + Duration::from_secs(1)).await;
        let refreshed = serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();

        assert_eq!(upstream.calls(), 2);
        assert_eq!(refreshed["call"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let proxy = proxy();
        let upstream = FakeUpstream::failing(500);

        assert!(serve_apod(&proxy, &upstream, "2024-01-01").await.is_err());
        assert!(serve_apod(&proxy, &upstream, "2024-01-01").await.is_err());

        assert_eq!(upstream.calls(), 2);
        assert_eq!(proxy.cache().stats(Region::DailyImage).count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_serves_marked_fallback_for_exact_date() {
        let proxy = proxy();
        let upstream = FakeUpstream::failing(429);

        let body = serve_apod(&proxy, &upstream, "2025-07-01").await.unwrap();

        assert_eq!(body["date"], "2025-07-01");
        assert_eq!(body["title"], "A Prominent Solar Filament");
        assert!(is_marked(&body));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_is_not_cached() {
        let proxy = proxy();
        let upstream = FakeUpstream::failing(429);

        serve_apod(&proxy, &upstream, "2025-07-01").await.unwrap();
        serve_apod(&proxy, &upstream, "2025-07-01").await.unwrap();

        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_masked() {
        let proxy = proxy();
        let upstream = FakeUpstream::failing(404);

        let err = serve_apod(&proxy, &upstream, "2025-07-01").await.unwrap_err();

        match err {
            ProxyError::UpstreamData(inner) => assert_eq!(inner.status(), Some(404)),
            other => panic!("expected data error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_bundled_data_propagates() {
        let proxy = proxy();
        let upstream = FakeUpstream::failing(429);

        let err = proxy
            .serve(
                Region::EarthImagery,
                CacheKey::new("/api/epic", None),
                FallbackRequest::Unavailable,
                upstream.fetch(),
                Ok,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::UpstreamRateLimited { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reshape_applies_to_fallback_and_keeps_marker() {
        let proxy = proxy();
        let upstream = FakeUpstream::failing(429);

        let body = proxy
            .serve(
                Region::DailyImage,
                apod_key("2025-06-28"),
                apod_fallback("2025-06-28"),
                upstream.fetch(),
                |raw| Ok(json!({ "wrapped": raw["title"] })),
            )
            .await
            .unwrap();

        assert_eq!(body, json!({ "wrapped": "The Andromeda Galaxy", "_isFallbackData": true }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_body_is_not_cached() {
        let proxy = proxy();
        let upstream = FakeUpstream::ok();

        let err = proxy
            .serve(
                Region::DailyImage,
                apod_key("2024-01-01"),
                apod_fallback("2024-01-01"),
                upstream.fetch(),
                |_| Err(ProxyError::malformed(Endpoint::Apod, "missing photos")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Malformed { .. }));
        assert_eq!(proxy.cache().stats(Region::DailyImage).count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_stats_track_hits_and_misses() {
        let proxy = proxy();
        let upstream = FakeUpstream::ok();

        serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();
        serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();
        serve_apod(&proxy, &upstream, "2024-01-01").await.unwrap();
        serve_apod(&proxy, &upstream, "2024-01-02").await.unwrap();

        let stats = proxy.cache().stats(Region::DailyImage);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }
}
