//! Inbound request rate limiting
//!
//! Two fixed-window tiers guard the proxy:
//!
//! - **general** - every API request, keyed by client IP
//! - **upstream** - stricter, only routes that may call the NASA API, since
//!   the NASA key's own budget is far smaller than what the cache can serve
//!
//! A rejected request is answered with 429 and never reaches the cache or the
//! upstream client.

mod middleware;
mod window;

pub use middleware::{client_identity, enforce};
pub use window::{RateDecision, RateLimiter, RateStatus};

/// Which limiter a decision came from; selects response text and headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitTier {
    General,
    Upstream,
}

impl LimitTier {
    pub fn name(self) -> &'static str {
        match self {
            LimitTier::General => "general",
            LimitTier::Upstream => "upstream",
        }
    }

    fn error(self) -> &'static str {
        match self {
            LimitTier::General => "Too many requests",
            LimitTier::Upstream => "NASA API rate limit protection",
        }
    }

    fn message(self) -> &'static str {
        match self {
            LimitTier::General => "Please slow down your requests. Try again in a minute.",
            LimitTier::Upstream => "Too many requests to NASA API. Please wait before trying again.",
        }
    }

    /// Names of the limit, remaining and reset headers
    fn header_names(self) -> [&'static str; 3] {
        match self {
            LimitTier::General => [
                "x-ratelimit-limit",
                "x-ratelimit-remaining",
                "x-ratelimit-reset",
            ],
            LimitTier::Upstream => [
                "x-upstream-ratelimit-limit",
                "x-upstream-ratelimit-remaining",
                "x-upstream-ratelimit-reset",
            ],
        }
    }
}
