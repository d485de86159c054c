//! Cache staleness decisions

use std::time::Duration;

use crate::cache::ContentCacheStore;
use crate::models::VersionStamp;
use crate::util::unix_millis_now;

/// Default maximum cache entry age before a refresh is forced: 24 hours
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Decides whether a cached domain must be refreshed against a
/// server-reported stamp.
///
/// Three independent staleness signals at different granularities
/// (structural version, content checksum, age) so no single signal failing
/// to fire can strand a client on stale content indefinitely.
pub struct CacheInvalidator {
    cache: ContentCacheStore,
    ttl: Duration,
}

impl CacheInvalidator {
    /// Create an invalidator with the default 24-hour TTL
    #[must_use]
    pub fn new(cache: ContentCacheStore) -> Self {
        Self {
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the TTL
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether the domain must be refetched.
    ///
    /// True when any of: no entry exists, the server has a newer version,
    /// the checksum drifted, or the entry is older than the TTL. Storage
    /// faults read as "refresh" so a broken store never pins stale content.
    pub fn needs_refresh(&self, domain: &str, stamp: &VersionStamp) -> bool {
        self.needs_refresh_at(domain, stamp, unix_millis_now())
    }

    fn needs_refresh_at(&self, domain: &str, stamp: &VersionStamp, now_ms: i64) -> bool {
        let entry = match self.cache.get::<serde_json::Value>(domain) {
            Ok(Some(entry)) => entry,
            Ok(None) => return true,
            Err(err) => {
                tracing::warn!("Treating unreadable cache entry for {domain} as stale: {err}");
                return true;
            }
        };

        is_stale(
            entry.version,
            &entry.checksum,
            entry.cached_at,
            stamp,
            now_ms,
            self.ttl,
        )
    }
}

/// The staleness predicate: logical OR of version, checksum, and age signals
fn is_stale(
    cached_version: u64,
    cached_checksum: &str,
    cached_at_ms: i64,
    stamp: &VersionStamp,
    now_ms: i64,
    ttl: Duration,
) -> bool {
    if cached_version < stamp.version {
        return true;
    }
    if cached_checksum != stamp.checksum {
        return true;
    }
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(cached_at_ms) > ttl_ms
}
