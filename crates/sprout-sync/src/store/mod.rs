//! Durable key-value storage primitives.
//!
//! Everything the sync core persists goes through [`DurableStore`]: the
//! pending attempt queue under one well-known key and one cache entry per
//! content domain. The handle is constructed once at application start with
//! [`open_durable`] and passed to each component, never reached through a
//! global.

mod memory;
mod sqlite;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Trait for durable string key-value storage
pub trait DurableStore {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any existing value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`; removing a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// List all stored keys
    fn keys(&self) -> Result<Vec<String>>;
}

/// Shared handle to a durable store
pub type StoreHandle = Arc<dyn DurableStore + Send + Sync>;

/// Open the on-device store at `path`, falling back to an in-memory store.
///
/// If SQLite fails to initialize the degradation is logged once and an
/// ephemeral [`MemoryStore`] is returned instead; callers never see the
/// failure. Data written to the fallback is lost on process exit.
pub fn open_durable(path: impl AsRef<Path>) -> StoreHandle {
    match SqliteStore::open(path.as_ref()) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::warn!(
                "Durable storage unavailable ({err}), falling back to in-memory store"
            );
            Arc::new(MemoryStore::new())
        }
    }
}
