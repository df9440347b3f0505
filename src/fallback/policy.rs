//! Classification of upstream failures as rate-limit conditions

use crate::upstream::UpstreamError;

/// Message fragments recognized as a rate-limit signal, compared case-insensitively
pub const DEFAULT_RATE_LIMIT_PATTERNS: [&str; 4] =
    ["rate limit", "too many requests", "over_rate_limit", "429"];

/// Decides which upstream failures are masked with fallback data
///
/// A failure is degraded when the API answered 429, or when any of the
/// configured patterns appears in the text of a status failure. Transport
/// failures are never degraded. Everything else propagates to the caller.
#[derive(Debug, Clone)]
pub struct DegradationPolicy {
    patterns: Vec<String>,
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_PATTERNS)
    }
}

impl DegradationPolicy {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_degraded(&self, err: &UpstreamError) -> bool {
        if err.status() == Some(429) {
            return true;
        }
        let Some(text) = err.status_text() else {
            return false;
        };
        let text = text.to_lowercase();
        self.patterns.iter().any(|pattern| text.contains(pattern.as_str()))
    }
}
