//! Canonical cache keys
//!
//! A key is the request path plus its query string with the parameters sorted,
//! so `?b=2&a=1` and `?a=1&b=2` address the same entry while any difference in
//! a parameter value (including pagination) yields a distinct entry.

use std::fmt;

use axum::http::Uri;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a key from a path and an optional raw query string
    pub fn new(path: &str, query: Option<&str>) -> Self {
        let path = normalize_path(path);
        match query.map(canonical_query).filter(|q| !q.is_empty()) {
            Some(query) => Self(format!("{}?{}", path, query)),
            None => Self(path.to_string()),
        }
    }

    /// Builds a key from a request URI
    pub fn from_uri(uri: &Uri) -> Self {
        Self::new(uri.path(), uri.query())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Sorts query parameters by name then value and re-encodes them.
///
/// A query string that cannot be decoded is kept verbatim; it can only ever
/// match itself.
fn canonical_query(raw: &str) -> String {
    let mut pairs: Vec<(String, String)> = match serde_urlencoded::from_str(raw) {
        Ok(pairs) => pairs,
        Err(_) => return raw.to_string(),
    };
    pairs.sort();
    serde_urlencoded::to_string(&pairs).unwrap_or_else(|_| raw.to_string())
}
