//! Fixed-window request counters keyed by client identity

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::time::Instant;

use super::LimitTier;

/// Requests observed from one client since `window_start`
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    request_count: u32,
}

/// Allowance left for a client after a request was counted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's window resets
    pub reset_in: Duration,
}

impl RateStatus {
    /// Wall-clock instant at which the window resets
    pub fn reset_at(&self) -> DateTime<Utc> {
        let reset_in =
            chrono::Duration::from_std(self.reset_in).unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() + reset_in
    }

    /// Whole seconds until reset, rounded up and at least one
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.reset_in.as_millis() as u64;
        millis.div_ceil(1000).max(1)
    }
}

/// Result of counting a request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDecision {
    /// Under the limit
    Allowed(RateStatus),
    /// Over the limit; the request must not go any further
    Limited(RateStatus),
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed(_))
    }

    pub fn status(&self) -> &RateStatus {
        match self {
            RateDecision::Allowed(status) | RateDecision::Limited(status) => status,
        }
    }
}

/// Fixed-window rate limiter
///
/// Each client gets `max_requests` per `window`, counted from its first
/// request. Windows that have elapsed are swept on every call rather than by a
/// background task, which costs O(tracked clients) per request.
#[derive(Debug)]
pub struct RateLimiter {
    tier: LimitTier,
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, RateWindow>,
}

impl RateLimiter {
    pub fn new(tier: LimitTier, max_requests: u32, window: Duration) -> Self {
        Self {
            tier,
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn tier(&self) -> LimitTier {
        self.tier
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Counts a request from `identity` and decides whether it may proceed
    pub fn check(&self, identity: &str) -> RateDecision {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.window_start) <= self.window);

        let mut entry = self
            .windows
            .entry(identity.to_string())
            .or_insert(RateWindow {
                window_start: now,
                request_count: 0,
            });
        let window = entry.value_mut();

        if now.duration_since(window.window_start) > self.window {
            window.window_start = now;
            window.request_count = 1;
        } else {
            window.request_count = window.request_count.saturating_add(1);
        }

        let status = RateStatus {
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.request_count),
            reset_in: (window.window_start + self.window).saturating_duration_since(now),
        };

        if window.request_count > self.max_requests {
            RateDecision::Limited(status)
        } else {
            RateDecision::Allowed(status)
        }
    }
}
