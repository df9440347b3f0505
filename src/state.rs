use std::sync::Arc;

use crate::{
    cache::ResponseCache,
    config::Config,
    fallback::DegradationPolicy,
    limiter::{LimitTier, RateLimiter},
    proxy::Proxy,
    upstream::NasaClient,
};

#[derive(Clone)]
pub struct AppState {
    /// Process configuration.
    pub config: Arc<Config>,
    /// NASA API client.
    pub client: NasaClient,
    /// Response cache and degradation policy.
    pub proxy: Arc<Proxy>,
    /// Limiter applied to every API request.
    pub general_limiter: Arc<RateLimiter>,
    /// Stricter limiter for routes that may call the NASA API.
    pub upstream_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Builds fresh, empty cache and limiter state from `config`
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = NasaClient::new(config.upstream_settings())?;
        let policy = DegradationPolicy::new(&config.rate_limit_patterns);
        let proxy = Proxy::new(Arc::new(ResponseCache::new()), policy);
        let window = config.rate_window();

        Ok(Self {
            general_limiter: Arc::new(RateLimiter::new(
                LimitTier::General,
                config.general_limit,
                window,
            )),
            upstream_limiter: Arc::new(RateLimiter::new(
                LimitTier::Upstream,
                config.upstream_limit,
                window,
            )),
            config: Arc::new(config),
            client,
            proxy: Arc::new(proxy),
        })
    }
}
