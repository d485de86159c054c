//! Versioned content cache.
//!
//! One [`CacheEntry`] per content domain (a game's question set, the level
//! list, asset manifests), persisted as a JSON blob in the durable store.
//! [`CacheInvalidator`] decides when a domain must be refetched;
//! [`DeltaMerger`] folds incremental updates in without a full refetch.

mod invalidate;
mod merge;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{CacheEntry, CACHE_SCHEMA_VERSION};
use crate::store::{DurableStore, StoreHandle};
use crate::util::unix_millis_now;

pub use invalidate::{CacheInvalidator, DEFAULT_TTL};
pub use merge::{DeltaMerger, Keyed};

/// Prefix for cache keys in the durable store, one key per content domain
const CACHE_KEY_PREFIX: &str = "content_cache:";

fn cache_key(domain: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{domain}")
}

/// Durable keyed storage of [`CacheEntry`] per content domain.
///
/// Reads always return the most recently written entry, stale or not;
/// staleness is the invalidator's decision, so callers can keep rendering a
/// stale cache while a refresh is pending.
#[derive(Clone)]
pub struct ContentCacheStore {
    store: StoreHandle,
}

impl ContentCacheStore {
    /// Create a cache store over the given store handle
    #[must_use]
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Read the cached entry for a domain, if any.
    ///
    /// An undecodable blob or a schema-tag mismatch reads as a miss (forcing
    /// a full refetch) rather than an error.
    pub fn get<T: DeserializeOwned>(&self, domain: &str) -> Result<Option<CacheEntry<T>>> {
        let Some(raw) = self.store.get(&cache_key(domain))? else {
            return Ok(None);
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Discarding undecodable cache entry for {domain}: {err}");
                return Ok(None);
            }
        };

        if entry.schema != CACHE_SCHEMA_VERSION {
            tracing::warn!(
                "Cache entry for {domain} has schema {} (expected {CACHE_SCHEMA_VERSION}), treating as miss",
                entry.schema
            );
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Overwrite the entry for a domain, stamping `cached_at = now`
    pub fn set<T: Serialize>(
        &self,
        domain: &str,
        data: &T,
        version: u64,
        checksum: &str,
    ) -> Result<()> {
        let entry = CacheEntry {
            schema: CACHE_SCHEMA_VERSION,
            data,
            version,
            checksum: checksum.to_string(),
            cached_at: unix_millis_now(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&cache_key(domain), &raw)
    }

    /// Remove the entry for one domain
    pub fn clear(&self, domain: &str) -> Result<()> {
        self.store.delete(&cache_key(domain))
    }

    /// Remove every cached domain, leaving non-cache keys untouched
    pub fn clear_all(&self) -> Result<()> {
        for key in self.store.keys()? {
            if key.starts_with(CACHE_KEY_PREFIX) {
                self.store.delete(&key)?;
            }
        }
        Ok(())
    }
}
