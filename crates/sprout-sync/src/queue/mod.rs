//! Durable offline mutation queue.
//!
//! Game rounds append a [`QueuedAttempt`] here whether or not the device is
//! online; [`QueueDrainer`] flushes the queue to the server once
//! connectivity returns.

mod drain;

use crate::error::Result;
use crate::models::QueuedAttempt;
use crate::store::{DurableStore, StoreHandle};

pub use drain::{AttemptClient, DrainReport, QueueDrainer, SubmitError};

/// Storage key the pending attempt list is persisted under
const QUEUE_KEY: &str = "pending_attempts";

/// Durable FIFO buffer of attempts awaiting server acknowledgement.
///
/// Every operation round-trips through the durable store so the queue
/// survives process restarts. Order is insertion order; there is no
/// uniqueness constraint on attempt ids.
pub struct MutationQueue {
    store: StoreHandle,
}

impl MutationQueue {
    /// Create a queue over the given store handle
    #[must_use]
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Append an attempt to the end of the persisted list
    pub fn enqueue(&self, attempt: QueuedAttempt) -> Result<()> {
        let mut pending = self.pending()?;
        pending.push(attempt);
        self.write(&pending)
    }

    /// Read the full pending list in enqueue order.
    ///
    /// A malformed persisted blob reads as an empty queue rather than an
    /// error; the bad blob is logged and will be overwritten by the next
    /// enqueue.
    pub fn pending(&self) -> Result<Vec<QueuedAttempt>> {
        let Some(raw) = self.store.get(QUEUE_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(attempts) => Ok(attempts),
            Err(err) => {
                tracing::warn!("Discarding undecodable pending queue: {err}");
                Ok(Vec::new())
            }
        }
    }

    /// Number of attempts currently pending; drives UI badges
    pub fn len(&self) -> Result<usize> {
        Ok(self.pending()?.len())
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.pending()?.is_empty())
    }

    /// Remove the persisted list entirely (used on logout)
    pub fn clear(&self) -> Result<()> {
        self.store.delete(QUEUE_KEY)
    }

    /// Replace the persisted list with exactly the given attempts.
    ///
    /// The drainer's re-queue path: after a pass, only the retryable subset
    /// is written back.
    pub(crate) fn replace(&self, attempts: &[QueuedAttempt]) -> Result<()> {
        if attempts.is_empty() {
            self.clear()
        } else {
            self.write(attempts)
        }
    }

    fn write(&self, attempts: &[QueuedAttempt]) -> Result<()> {
        let raw = serde_json::to_string(attempts)?;
        self.store.set(QUEUE_KEY, &raw)
    }
}
