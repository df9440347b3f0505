//! Response cache keeping successful upstream payloads in memory
//!
//! Provides a `ResponseCache` that stores JSON payloads per region with the
//! region's TTL, and tracks hit/miss counts for the admin stats endpoint.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use super::{CacheKey, Region};

/// A payload stored in the cache
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached payload
    value: Value,
    /// When the payload was stored
    stored_at: Instant,
    /// How long the payload stays valid
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.stored_at + self.ttl
    }
}

/// Entries and counters for one region
#[derive(Debug)]
struct RegionStore {
    ttl: Duration,
    entries: DashMap<CacheKey, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RegionStore {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

/// Snapshot of a region's cache activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of live (unexpired) entries
    pub count: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 when nothing has been looked up
    pub hit_rate: f64,
}

/// In-memory response cache partitioned by region
///
/// A key maps to at most one entry per region. Writes are last-write-wins and
/// an entry stops being served once its TTL has elapsed; expired entries are
/// dropped the next time they are looked up. All operations are infallible.
#[derive(Debug)]
pub struct ResponseCache {
    regions: HashMap<Region, RegionStore>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Creates a cache using each region's standard TTL
    pub fn new() -> Self {
        Self::with_ttls(Region::ttl)
    }

    /// Creates a cache with custom TTLs
    ///
    /// Useful for testing expiry without waiting hours.
    pub fn with_ttls(ttl_for: impl Fn(Region) -> Duration) -> Self {
        let regions = Region::ALL
            .into_iter()
            .map(|region| (region, RegionStore::new(ttl_for(region))))
            .collect();
        Self { regions }
    }

    fn store(&self, region: Region) -> &RegionStore {
        // Every region is inserted at construction and never removed.
        &self.regions[&region]
    }

    /// Returns the cached payload if present and not expired
    ///
    /// A missing entry and an expired entry both count as a miss.
    pub fn get(&self, region: Region, key: &CacheKey) -> Option<Value> {
        let store = self.store(region);
        let now = Instant::now();

        let hit = match store.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            _ => None,
        };

        match hit {
            Some(value) => {
                store.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(region = %region, key = %key, "cache hit");
                Some(value)
            }
            None => {
                store.entries.remove_if(key, |_, entry| entry.is_expired(now));
                store.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(region = %region, key = %key, "cache miss");
                None
            }
        }
    }

    /// Stores a payload with the region's TTL, replacing any existing entry
    pub fn put(&self, region: Region, key: CacheKey, value: Value) {
        let store = self.store(region);
        tracing::debug!(region = %region, key = %key, "cached");
        store.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl: store.ttl,
            },
        );
    }

    /// Removes every entry in `region`, or in all regions when `None`
    ///
    /// Hit and miss counters of the flushed regions are reset as well.
    pub fn flush(&self, region: Option<Region>) {
        let targets: Vec<Region> = match region {
            Some(region) => vec![region],
            None => Region::ALL.to_vec(),
        };
        for region in targets {
            let store = self.store(region);
            store.entries.clear();
            store.hits.store(0, Ordering::Relaxed);
            store.misses.store(0, Ordering::Relaxed);
        }
        tracing::info!(region = ?region.map(Region::name), "cache flushed");
    }

    /// Returns activity counters for one region
    pub fn stats(&self, region: Region) -> CacheStats {
        let store = self.store(region);
        let now = Instant::now();
        let count = store
            .entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count();
        let hits = store.hits.load(Ordering::Relaxed);
        let misses = store.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };

        CacheStats {
            count,
            hits,
            misses,
            hit_rate,
        }
    }

    /// Returns activity counters for every region, keyed by region name
    pub fn all_stats(&self) -> BTreeMap<&'static str, CacheStats> {
        Region::ALL
            .into_iter()
            .map(|region| (region.name(), self.stats(region)))
            .collect()
    }
}
