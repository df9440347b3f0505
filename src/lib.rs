//! NASA API proxy library
//!
//! This module exposes the cache, limiter, fallback and routing layers for use
//! in integration tests and by the server binary.

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod limiter;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod upstream;
