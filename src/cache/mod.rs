//! Cache module for memorizing upstream responses in memory
//!
//! This module provides a response cache partitioned into one region per NASA
//! resource category. Each region has a fixed TTL; entries are invalid once
//! that TTL has elapsed and are evicted lazily on lookup. Keys are canonical
//! request paths so that query parameter order never produces distinct entries.

mod key;
mod manager;
mod region;

pub use key::CacheKey;
pub use manager::{CacheStats, ResponseCache};
pub use region::Region;
