//! sprout-sync - Offline synchronization core for Sprout
//!
//! This crate carries the durable mutation queue for pending game attempts
//! and the versioned content cache shared by all Sprout clients. Game rounds
//! enqueue their results whether or not the device is online; a reconnect or
//! foreground event drains the queue against the server. Content screens
//! consult the cache invalidator before fetching and fold incremental
//! updates in through the delta merger.

pub mod cache;
pub mod error;
pub mod models;
pub mod queue;
pub mod rpc;
pub mod store;
mod util;

pub use cache::{CacheInvalidator, ContentCacheStore, DeltaMerger, Keyed};
pub use error::{Error, Result};
pub use models::{AttemptId, CacheEntry, QueuedAttempt, VersionStamp};
pub use queue::{AttemptClient, DrainReport, MutationQueue, QueueDrainer, SubmitError};
pub use store::{open_durable, DurableStore, StoreHandle};
