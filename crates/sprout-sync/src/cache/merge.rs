//! Incremental content updates

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::ContentCacheStore;
use crate::error::Result;

/// Item identity for the merge overlay
pub trait Keyed {
    /// Stable identity of this item within its content domain
    fn key(&self) -> &str;
}

/// Folds an incremental content update into the cache without a full refetch.
///
/// The merge is strictly additive/overwrite: items in the delta replace
/// cached items with the same identity or are appended, and nothing absent
/// from the delta is removed. Server-side deletions are therefore not
/// observable here; only a full refetch or an explicit cache-clear can
/// shrink the cached collection.
pub struct DeltaMerger {
    cache: ContentCacheStore,
}

impl DeltaMerger {
    /// Create a merger over the given cache store
    #[must_use]
    pub fn new(cache: ContentCacheStore) -> Self {
        Self { cache }
    }

    /// Merge `delta` into the cached collection for a domain and stamp the
    /// entry with the new version and checksum.
    ///
    /// On a cache miss the delta is the complete dataset and is written
    /// verbatim (bootstrap). On a hit, each delta item replaces the cached
    /// item with the same key in place, or is appended; cached order is
    /// preserved, new items arrive in delta order. Returns the merged
    /// collection as written.
    pub fn merge<T>(
        &self,
        domain: &str,
        delta: Vec<T>,
        version: u64,
        checksum: &str,
    ) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Keyed,
    {
        let merged = match self.cache.get::<Vec<T>>(domain)? {
            None => delta,
            Some(entry) => {
                let mut merged = entry.data;
                for item in delta {
                    match merged.iter().position(|existing| existing.key() == item.key()) {
                        Some(idx) => merged[idx] = item,
                        None => merged.push(item),
                    }
                }
                merged
            }
        };

        self.cache.set(domain, &merged, version, checksum)?;
        Ok(merged)
    }
}
