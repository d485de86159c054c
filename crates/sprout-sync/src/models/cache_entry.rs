//! Versioned content cache entry model

use serde::{Deserialize, Serialize};

/// Schema tag written into every serialized cache entry.
///
/// Bump this when the record shape changes; entries carrying an older tag
/// read back as cache misses instead of undecodable garbage.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Last known state of one content domain (e.g. "spices", "levels").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Serialized record shape tag, see [`CACHE_SCHEMA_VERSION`]
    pub schema: u32,
    /// The domain payload
    pub data: T,
    /// Server-assigned revision, never decreases for a domain
    pub version: u64,
    /// Server-computed content hash, detects drift without a version bump
    pub checksum: String,
    /// Local write timestamp (Unix ms)
    pub cached_at: i64,
}

/// Server-reported staleness stamp for a content domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionStamp {
    /// Structural revision counter
    pub version: u64,
    /// Content hash
    pub checksum: String,
}

impl VersionStamp {
    /// Create a stamp from a version and checksum
    #[must_use]
    pub fn new(version: u64, checksum: impl Into<String>) -> Self {
        Self {
            version,
            checksum: checksum.into(),
        }
    }
}
