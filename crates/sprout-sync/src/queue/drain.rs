//! Queue drainer: flushes pending attempts to the remote endpoint

use async_trait::async_trait;
use thiserror::Error;

use crate::error::Result;
use crate::models::QueuedAttempt;
use crate::queue::MutationQueue;
use crate::store::StoreHandle;

/// Classified submission failure, decided by the transport.
///
/// The drainer never inspects error text; the client tags each failure as
/// retryable (connectivity-level, attempt is re-queued) or terminal
/// (validation, auth, business-rule rejection, attempt is dropped).
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Network-level failure; the attempt stays queued for a future drain
    #[error("Retryable submission failure: {0}")]
    Retryable(String),

    /// Remote rejection; the attempt is dropped without further retries
    #[error("Terminal submission failure: {0}")]
    Terminal(String),
}

/// Trait for the remote attempt-submission endpoint
#[async_trait]
pub trait AttemptClient {
    /// Submit one attempt under the given credential token
    async fn submit(
        &self,
        credential_token: &str,
        attempt: &QueuedAttempt,
    ) -> std::result::Result<(), SubmitError>;
}

/// Outcome of one drain pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainReport {
    /// Attempts acknowledged by the server
    pub submitted: usize,
    /// Attempts kept for a future drain after a retryable failure
    pub requeued: usize,
    /// Attempts dropped for good after a terminal rejection
    pub dropped: Vec<QueuedAttempt>,
}

type DropListener = dyn Fn(&QueuedAttempt, &str) + Send + Sync;

/// Flushes the [`MutationQueue`] to the remote endpoint.
///
/// Submissions are strictly sequential in enqueue order, so the server sees
/// score and streak updates chronologically. An internal guard serializes
/// overlapping drain triggers (a connectivity-regained event and a
/// foreground event firing close together): the second caller waits for the
/// in-flight pass, then re-reads the queue, so the same attempt is never
/// submitted twice.
pub struct QueueDrainer {
    queue: MutationQueue,
    in_flight: tokio::sync::Mutex<()>,
    drop_listener: Option<Box<DropListener>>,
}

impl QueueDrainer {
    /// Create a drainer over the given store handle
    #[must_use]
    pub fn new(store: StoreHandle) -> Self {
        Self {
            queue: MutationQueue::new(store),
            in_flight: tokio::sync::Mutex::new(()),
            drop_listener: None,
        }
    }

    /// Register a callback fired for every terminally dropped attempt.
    ///
    /// Hosts that trigger drains fire-and-forget use this to surface the
    /// drop to the user instead of letting the attempt vanish silently.
    #[must_use]
    pub fn with_drop_listener(
        mut self,
        listener: impl Fn(&QueuedAttempt, &str) + Send + Sync + 'static,
    ) -> Self {
        self.drop_listener = Some(Box::new(listener));
        self
    }

    /// Submit all pending attempts, in enqueue order, one at a time.
    ///
    /// Successful attempts leave the queue; retryable failures are written
    /// back as the new pending list; terminal failures are dropped and
    /// reported. Returns once the full pass and the queue write-back are
    /// complete.
    pub async fn drain<C>(&self, client: &C, credential_token: &str) -> Result<DrainReport>
    where
        C: AttemptClient + Sync,
    {
        let _guard = self.in_flight.lock().await;

        let pending = self.queue.pending()?;
        if pending.is_empty() {
            return Ok(DrainReport::default());
        }

        tracing::debug!("Draining {} pending attempt(s)", pending.len());

        let mut report = DrainReport::default();
        let mut retained = Vec::new();

        for attempt in pending {
            match client.submit(credential_token, &attempt).await {
                Ok(()) => {
                    report.submitted += 1;
                }
                Err(SubmitError::Retryable(reason)) => {
                    tracing::warn!(
                        "Attempt {} hit a network failure, keeping it queued: {reason}",
                        attempt.id
                    );
                    retained.push(attempt);
                }
                Err(SubmitError::Terminal(reason)) => {
                    tracing::warn!("Attempt {} rejected, dropping it: {reason}", attempt.id);
                    if let Some(listener) = &self.drop_listener {
                        listener(&attempt, &reason);
                    }
                    report.dropped.push(attempt);
                }
            }
        }

        report.requeued = retained.len();
        self.queue.replace(&retained)?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttemptId;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Test double: scripted per-level outcomes, records submission order
    #[derive(Default)]
    struct ScriptedClient {
        failures: Mutex<HashMap<String, &'static str>>,
        submitted: Mutex<Vec<AttemptId>>,
        delay: Option<Duration>,
    }

    impl ScriptedClient {
        fn failing(level_id: &str, kind: &'static str) -> Self {
            let client = Self::default();
            client
                .failures
                .lock()
                .unwrap()
                .insert(level_id.to_string(), kind);
            client
        }

        fn submitted(&self) -> Vec<AttemptId> {
            self.submitted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AttemptClient for ScriptedClient {
        async fn submit(
            &self,
            _credential_token: &str,
            attempt: &QueuedAttempt,
        ) -> std::result::Result<(), SubmitError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let failure = self.failures.lock().unwrap().get(&attempt.level_id).copied();
            match failure {
                Some("retryable") => {
                    Err(SubmitError::Retryable("Network request failed".to_string()))
                }
                Some(_) => Err(SubmitError::Terminal("Invalid level".to_string())),
                None => {
                    self.submitted.lock().unwrap().push(attempt.id);
                    Ok(())
                }
            }
        }
    }

    fn setup() -> (MutationQueue, QueueDrainer) {
        let store: StoreHandle = Arc::new(MemoryStore::new());
        let queue = MutationQueue::new(Arc::clone(&store));
        let drainer = QueueDrainer::new(store);
        (queue, drainer)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_on_empty_queue_is_a_no_op() {
        let (_, drainer) = setup();
        let client = ScriptedClient::default();

        let report = drainer.drain(&client, "token").await.unwrap();
        assert_eq!(report, DrainReport::default());
        assert!(client.submitted().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drain_submits_in_enqueue_order() {
        let (queue, drainer) = setup();
        let client = ScriptedClient::default();

        let a = QueuedAttempt::new("L1", "easy", 80, 10);
        let b = QueuedAttempt::new("L2", "hard", 95, 25);
        queue.enqueue(a.clone()).unwrap();
        queue.enqueue(b.clone()).unwrap();

        let report = drainer.drain(&client, "token").await.unwrap();

        assert_eq!(report.submitted, 2);
        assert_eq!(client.submitted(), vec![a.id, b.id]);
        assert!(queue.is_empty().unwrap());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn retryable_failures_are_requeued() {
        let (queue, drainer) = setup();
        let client = ScriptedClient::failing("L2", "retryable");

        let a = QueuedAttempt::new("L1", "easy", 80, 10);
        let b = QueuedAttempt::new("L2", "hard", 95, 25);
        queue.enqueue(a).unwrap();
        queue.enqueue(b.clone()).unwrap();

        let report = drainer.drain(&client, "token").await.unwrap();

        assert_eq!(report.submitted, 1);
        assert_eq!(report.requeued, 1);
        assert_eq!(queue.pending().unwrap(), vec![b]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn terminal_failures_are_dropped_for_good() {
        let (queue, drainer) = setup();
        let client = ScriptedClient::failing("L1", "terminal");

        let a = QueuedAttempt::new("L1", "easy", 80, 10);
        queue.enqueue(a.clone()).unwrap();

        let report = drainer.drain(&client, "token").await.unwrap();

        assert_eq!(report.submitted, 0);
        assert_eq!(report.dropped, vec![a]);
        assert!(queue.is_empty().unwrap());

        // A second drain finds nothing to retry
        let second = drainer.drain(&client, "token").await.unwrap();
        assert_eq!(second, DrainReport::default());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drop_listener_fires_per_terminal_drop() {
        let store: StoreHandle = Arc::new(MemoryStore::new());
        let queue = MutationQueue::new(Arc::clone(&store));

        let seen: Arc<Mutex<Vec<(AttemptId, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let drainer = QueueDrainer::new(store).with_drop_listener(move |attempt, reason| {
            sink.lock().unwrap().push((attempt.id, reason.to_string()));
        });

        let a = QueuedAttempt::new("L1", "easy", 80, 10);
        queue.enqueue(a.clone()).unwrap();

        let client = ScriptedClient::failing("L1", "terminal");
        drainer.drain(&client, "token").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, a.id);
        assert_eq!(seen[0].1, "Invalid level");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_drains_never_double_submit() {
        let store: StoreHandle = Arc::new(MemoryStore::new());
        let queue = MutationQueue::new(Arc::clone(&store));
        let drainer = Arc::new(QueueDrainer::new(store));

        queue
            .enqueue(QueuedAttempt::new("L1", "easy", 80, 10))
            .unwrap();
        queue
            .enqueue(QueuedAttempt::new("L2", "hard", 95, 25))
            .unwrap();

        let client = Arc::new(ScriptedClient {
            delay: Some(Duration::from_millis(20)),
            ..ScriptedClient::default()
        });

        // Two triggers firing close together: reconnect + foreground
        let first = {
            let drainer = Arc::clone(&drainer);
            let client = Arc::clone(&client);
            tokio::spawn(async move { drainer.drain(client.as_ref(), "token").await })
        };
        let second = {
            let drainer = Arc::clone(&drainer);
            let client = Arc::clone(&client);
            tokio::spawn(async move { drainer.drain(client.as_ref(), "token").await })
        };

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        // One pass does the work, the deferred pass finds an empty queue
        assert_eq!(first.submitted + second.submitted, 2);
        assert_eq!(client.submitted().len(), 2);
        assert!(queue.is_empty().unwrap());
    }
}
