//! Error types for sprout-sync

use thiserror::Error;

/// Result type alias using sprout-sync's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sprout-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// Durable storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
