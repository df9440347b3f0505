//! Structured upstream failures

use thiserror::Error;

use super::Endpoint;

/// Errors that can occur when calling a NASA API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No response was received (connection refused, DNS, timeout)
    #[error("{endpoint}: Unable to reach NASA API. Please check your connection.")]
    Unavailable {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status
    #[error("{message}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        /// Client-facing description of the failure
        message: String,
        /// Message or error code reported by the API itself, if any
        detail: Option<String>,
    },

    /// The API answered 2xx but the body was not valid JSON
    #[error("{endpoint}: Failed to parse NASA API response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    /// Builds a status failure, translating well-known statuses
    pub fn from_status(endpoint: Endpoint, status: u16, detail: Option<String>) -> Self {
        let message = match status {
            429 => "NASA API rate limit exceeded. Please try again later.".to_string(),
            403 => "NASA API key is invalid or missing. Please check your configuration.".to_string(),
            404 => format!("{}: Requested data not found.", endpoint),
            _ => format!(
                "{} API Error ({}): {}",
                endpoint,
                status,
                detail.as_deref().unwrap_or("Unknown error")
            ),
        };
        UpstreamError::Status {
            endpoint,
            status,
            message,
            detail,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            UpstreamError::Unavailable { endpoint, .. }
            | UpstreamError::Status { endpoint, .. }
            | UpstreamError::Decode { endpoint, .. } => *endpoint,
        }
    }

    /// HTTP status reported by the API, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message and upstream detail of a status failure, for pattern matching
    ///
    /// Transport and decode failures have no such text: theirs comes from the
    /// HTTP client and embeds the request URL, API key included.
    pub fn status_text(&self) -> Option<String> {
        match self {
            UpstreamError::Status {
                message,
                detail: Some(detail),
                ..
            } => Some(format!("{} {}", message, detail)),
            UpstreamError::Status { message, .. } => Some(message.clone()),
            UpstreamError::Unavailable { .. } | UpstreamError::Decode { .. } => None,
        }
    }
}
