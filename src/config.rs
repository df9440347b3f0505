//! Process configuration from command-line flags and environment variables
//!
//! Every flag has an environment fallback so the proxy can be configured with
//! a `.env` file, which `main` loads before parsing.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::fallback::DEFAULT_RATE_LIMIT_PATTERNS;
use crate::upstream::{UpstreamSettings, NASA_BASE_URL, NASA_IMAGES_BASE_URL};

/// Error types for configuration validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A limit or duration that must be positive was zero
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// A base URL could not be parsed
    #[error("Invalid URL for {name}: '{value}'")]
    InvalidUrl { name: &'static str, value: String },

    /// An allowed origin is not a valid header value
    #[error("Invalid allowed origin: '{0}'")]
    InvalidOrigin(String),

    /// Host and port do not form a socket address
    #[error("Invalid listen address: '{0}'")]
    InvalidAddress(String),
}

/// NASA API proxy with caching, rate limiting and fallback data
#[derive(Parser, Debug, Clone)]
#[command(name = "nasa-proxy")]
#[command(about = "Caching, rate-limited proxy for NASA's public APIs")]
#[command(version)]
pub struct Config {
    /// Interface to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// api.nasa.gov key; DEMO_KEY is heavily rate limited
    #[arg(long, env = "NASA_API_KEY", default_value = "DEMO_KEY", hide_env_values = true)]
    pub nasa_api_key: String,

    /// Base URL of api.nasa.gov
    #[arg(long, env = "NASA_BASE_URL", default_value = NASA_BASE_URL)]
    pub nasa_base_url: String,

    /// Base URL of the Image and Video Library
    #[arg(long, env = "NASA_IMAGES_BASE_URL", default_value = NASA_IMAGES_BASE_URL)]
    pub images_base_url: String,

    /// Origins allowed to make cross-origin requests (comma-separated)
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:5173"
    )]
    pub allowed_origins: Vec<String>,

    /// Set to "production" for JSON logging and terse error bodies
    #[arg(long = "env", env = "APP_ENV", default_value = "development")]
    pub environment: String,

    /// Timeout for a single NASA API call, in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    /// Requests per client per window, across the whole API
    #[arg(long, env = "GENERAL_RATE_LIMIT", default_value_t = 30)]
    pub general_limit: u32,

    /// Requests per client per window to routes that may call the NASA API
    #[arg(long, env = "UPSTREAM_RATE_LIMIT", default_value_t = 10)]
    pub upstream_limit: u32,

    /// Length of the rate limit window, in seconds
    #[arg(long, env = "RATE_WINDOW_SECS", default_value_t = 60)]
    pub rate_window_secs: u64,

    /// Message fragment marking an upstream failure as a rate limit (repeatable)
    #[arg(
        long = "rate-limit-pattern",
        env = "RATE_LIMIT_PATTERNS",
        value_delimiter = ',',
        default_values = DEFAULT_RATE_LIMIT_PATTERNS
    )]
    pub rate_limit_patterns: Vec<String>,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }

    pub fn upstream_settings(&self) -> UpstreamSettings {
        UpstreamSettings {
            api_key: self.nasa_api_key.clone(),
            base_url: self.nasa_base_url.clone(),
            images_base_url: self.images_base_url.clone(),
            timeout: Duration::from_secs(self.upstream_timeout_secs),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }

    /// Checks values clap cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("--general-limit", u64::from(self.general_limit)),
            ("--upstream-limit", u64::from(self.upstream_limit)),
            ("--rate-window-secs", self.rate_window_secs),
            ("--upstream-timeout-secs", self.upstream_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }

        for (name, value) in [
            ("--nasa-base-url", &self.nasa_base_url),
            ("--images-base-url", &self.images_base_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    name,
                    value: value.clone(),
                });
            }
        }

        for origin in &self.allowed_origins {
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::InvalidOrigin(origin.clone()));
            }
        }

        self.bind_addr()?;
        Ok(())
    }
}
