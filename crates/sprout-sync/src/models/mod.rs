//! Data models for sprout-sync

mod attempt;
mod cache_entry;

pub use attempt::{AttemptId, QueuedAttempt};
pub use cache_entry::{CacheEntry, VersionStamp, CACHE_SCHEMA_VERSION};
