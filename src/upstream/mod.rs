//! Upstream NASA API access
//!
//! This module contains the HTTP client for the NASA APIs, the structured
//! failures it produces, and the request parameter types it accepts.

mod client;
mod error;
mod types;

pub use client::{NasaClient, UpstreamSettings, NASA_BASE_URL, NASA_IMAGES_BASE_URL};
pub use error::UpstreamError;
pub use types::{Endpoint, MediaType, Rover};
