//! Core types shared across Warden components.

use serde::{Deserialize, Serialize};

/// Opaque fixed-length storage key derived from an identity value.
///
/// Derivation is a pure function of the input: the same value always yields
/// the same key. Distinct values may collide (the pre-hash normalization is
/// lossy by design) and the raw value cannot be recovered from the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockoutKey(String);

impl LockoutKey {
    /// Wrap an already-derived key string.
    pub fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LockoutKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-key failure state.
///
/// Immutable value object: every update produces a new record that is written
/// back to the store, never a shared record mutated in place. A record exists
/// in the store iff at least one failure has been recorded since the last
/// reset; absence is equivalent to zero attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Consecutive failures since the last success or served penalty
    pub attempts: u32,

    /// Timestamp of the most recent recorded failure (Unix epoch seconds)
    pub last_attempt: i64,
}

impl AttemptRecord {
    /// Record for the first failure of a clear key.
    pub fn first(now: i64) -> Self {
        Self {
            attempts: 1,
            last_attempt: now,
        }
    }

    /// Successor record: one more failure, observed at `now`.
    pub fn next(&self, now: i64) -> Self {
        Self {
            attempts: self.attempts.saturating_add(1),
            last_attempt: now,
        }
    }

    /// Seconds elapsed since the last recorded failure.
    ///
    /// Clamped at zero when `now` precedes `last_attempt` (clock skew), which
    /// leaves the full penalty window in force.
    pub fn elapsed_secs(&self, now: i64) -> u64 {
        (now - self.last_attempt).max(0) as u64
    }

    /// Classify this record at evaluation time.
    pub fn state(&self, now: i64, allowed_attempts: u32, penalty_seconds: u64) -> KeyState {
        if self.attempts == 0 {
            KeyState::Clear
        } else if self.attempts < allowed_attempts {
            KeyState::Accumulating
        } else if self.elapsed_secs(now) > penalty_seconds {
            KeyState::PenaltyExpired
        } else {
            KeyState::Locked
        }
    }
}

/// Evaluation-time state of a key.
///
/// `PenaltyExpired` is never stored: observing it collapses the key back to
/// `Clear` by deleting the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// No record / zero attempts
    Clear,
    /// Failures recorded, threshold not reached
    Accumulating,
    /// Threshold reached and the penalty window is still running
    Locked,
    /// Threshold reached but the penalty window has elapsed
    PenaltyExpired,
}

/// Outcome of a lockout check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// The attempt may proceed
    Allow,
    /// The key is locked; retry after the given number of seconds
    Reject {
        /// Remaining penalty time in seconds
        retry_after_secs: u64,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
