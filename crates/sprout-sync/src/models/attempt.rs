//! Queued game-attempt model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::util::unix_millis_now;

/// A unique identifier for a queued attempt, using UUID v7 (time-sortable)
///
/// Generated on the device when the game round ends. The id travels with the
/// submission payload so the server can deduplicate a retried attempt that
/// actually landed the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Create a new unique attempt ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AttemptId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One completed game round awaiting server acknowledgement.
///
/// Immutable once created; the queue preserves insertion order through
/// persistence round-trips and places no uniqueness constraint on `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAttempt {
    /// Stable client-generated identifier
    pub id: AttemptId,
    /// Level the round was played on
    pub level_id: String,
    /// Difficulty the round was played at
    pub difficulty: String,
    /// Final score for the round
    pub score: u32,
    /// Round completion timestamp (Unix ms)
    pub recorded_at: i64,
    /// Locally computed optimistic coin reward
    pub coins_awarded: u32,
}

impl QueuedAttempt {
    /// Create a new attempt record, stamping its id and completion time
    #[must_use]
    pub fn new(
        level_id: impl Into<String>,
        difficulty: impl Into<String>,
        score: u32,
        coins_awarded: u32,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            level_id: level_id.into(),
            difficulty: difficulty.into(),
            score,
            recorded_at: unix_millis_now(),
            coins_awarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn attempt_id_round_trips_through_string() {
        let id = AttemptId::new();
        let parsed: AttemptId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn new_attempt_stamps_timestamp() {
        let attempt = QueuedAttempt::new("L1", "easy", 80, 10);
        assert!(attempt.recorded_at > 0);
        assert_eq!(attempt.level_id, "L1");
        assert_eq!(attempt.difficulty, "easy");
        assert_eq!(attempt.score, 80);
        assert_eq!(attempt.coins_awarded, 10);
    }

    #[test]
    fn attempt_serde_round_trip() {
        let attempt = QueuedAttempt::new("L2", "hard", 95, 25);
        let json = serde_json::to_string(&attempt).unwrap();
        let back: QueuedAttempt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attempt);
    }
}
