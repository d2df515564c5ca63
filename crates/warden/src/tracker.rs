//! Lockout decision engine.

use warden_common::{AttemptRecord, Decision, KeyState, LockoutKey, WardenError};

use crate::store::AttemptStore;

/// Decision engine for per-key failed-attempt lockout.
///
/// Holds no per-key state of its own; every operation is a single
/// request/response against the attempt store. Operations on different keys
/// are fully independent.
pub struct LockoutTracker<S> {
    store: S,

    /// Attempts strictly below this are never blocked
    allowed_attempts: u32,

    /// Minimum wait in seconds once the threshold is reached
    penalty_seconds: u64,
}

impl<S: AttemptStore> LockoutTracker<S> {
    pub fn new(store: S, allowed_attempts: u32, penalty_seconds: u64) -> Self {
        Self {
            store,
            allowed_attempts,
            penalty_seconds,
        }
    }

    /// Decide whether an attempt for `key` may proceed at `now`.
    ///
    /// A record whose penalty window has fully elapsed is deleted before
    /// allowing, so the next failure counts from 1. Store failures propagate;
    /// an unreachable store never yields `Allow`.
    pub async fn check(&self, key: &LockoutKey, now: i64) -> Result<Decision, WardenError> {
        let record = match self.store.get(key).await? {
            Some(record) => record,
            None => return Ok(Decision::Allow),
        };

        match record.state(now, self.allowed_attempts, self.penalty_seconds) {
            KeyState::Clear | KeyState::Accumulating => Ok(Decision::Allow),
            KeyState::Locked => {
                let retry_after_secs = self.penalty_seconds - record.elapsed_secs(now);
                tracing::debug!(
                    key = %key,
                    attempts = record.attempts,
                    retry_after_secs,
                    "Attempt rejected during penalty window"
                );
                Ok(Decision::Reject { retry_after_secs })
            }
            KeyState::PenaltyExpired => {
                self.store.delete(key).await?;
                tracing::debug!(key = %key, "Penalty served, record cleared");
                Ok(Decision::Allow)
            }
        }
    }

    /// Record a failed attempt at `now`, returning the stored record.
    ///
    /// The read-modify-write is not atomic: two racing failures for the same
    /// key can both observe N and both write N+1, losing one increment.
    /// Repeated failures while already locked refresh `last_attempt`, which
    /// restarts the penalty window from the most recent probe.
    pub async fn on_failure(&self, key: &LockoutKey, now: i64) -> Result<AttemptRecord, WardenError> {
        let record = match self.store.get(key).await? {
            Some(prev) => prev.next(now),
            None => AttemptRecord::first(now),
        };

        self.store.set(key, &record).await?;

        if record.attempts >= self.allowed_attempts {
            tracing::warn!(
                key = %key,
                attempts = record.attempts,
                penalty_seconds = self.penalty_seconds,
                "Key locked after repeated failures"
            );
        }

        Ok(record)
    }

    /// Clear any record for `key`. Idempotent; safe in every state.
    pub async fn on_success(&self, key: &LockoutKey) -> Result<(), WardenError> {
        self.store.delete(key).await?;
        tracing::debug!(key = %key, "Attempt count reset");
        Ok(())
    }

    /// Current record for `key`, if any. Read-only; no state transition.
    pub async fn peek(&self, key: &LockoutKey) -> Result<Option<AttemptRecord>, WardenError> {
        self.store.get(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Store double simulating an unreachable backend.
    #[derive(Clone)]
    struct UnavailableStore;

    #[async_trait]
    impl AttemptStore for UnavailableStore {
        async fn get(&self, _key: &LockoutKey) -> Result<Option<AttemptRecord>, WardenError> {
            Err(WardenError::StoreUnavailable("connection refused".into()))
        }

        async fn set(&self, _key: &LockoutKey, _record: &AttemptRecord) -> Result<(), WardenError> {
            Err(WardenError::StoreUnavailable("connection refused".into()))
        }

        async fn delete(&self, _key: &LockoutKey) -> Result<(), WardenError> {
            Err(WardenError::StoreUnavailable("connection refused".into()))
        }
    }

    fn key(name: &str) -> LockoutKey {
        LockoutKey::new(name.to_string())
    }

    fn tracker(store: MemoryStore) -> LockoutTracker<MemoryStore> {
        LockoutTracker::new(store, 5, 60)
    }

    #[tokio::test]
    async fn test_below_threshold_allows() {
        let tracker = tracker(MemoryStore::new());
        let k = key("alice");

        for i in 0..4 {
            assert!(tracker.check(&k, 1000 + i).await.unwrap().is_allowed());
            tracker.on_failure(&k, 1000 + i).await.unwrap();
        }

        assert!(tracker.check(&k, 1005).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_lockout_at_threshold() {
        let store = MemoryStore::new();
        let tracker = tracker(store.clone());
        let k = key("alice");

        // Five failures at t0..t0+4.
        for i in 0..5 {
            tracker.on_failure(&k, 1000 + i).await.unwrap();
        }

        let decision = tracker.check(&k, 1005).await.unwrap();
        assert_eq!(
            decision,
            Decision::Reject {
                retry_after_secs: 59
            }
        );
    }

    #[tokio::test]
    async fn test_penalty_expiry_clears_record() {
        let store = MemoryStore::new();
        let tracker = tracker(store.clone());
        let k = key("alice");

        for i in 0..5 {
            tracker.on_failure(&k, 1000 + i).await.unwrap();
        }

        // Last failure at t0+4; window over strictly after t0+64.
        assert!(tracker.check(&k, 1065).await.unwrap().is_allowed());
        assert!(store.get(&k).await.unwrap().is_none());

        // A following failure starts counting from 1 again.
        let record = tracker.on_failure(&k, 1066).await.unwrap();
        assert_eq!(record.attempts, 1);
    }

    #[tokio::test]
    async fn test_window_boundary_is_inclusive() {
        let tracker = tracker(MemoryStore::new());
        let k = key("alice");

        for _ in 0..5 {
            tracker.on_failure(&k, 1000).await.unwrap();
        }

        // elapsed == penalty still rejects; only strictly-greater clears.
        assert_eq!(
            tracker.check(&k, 1060).await.unwrap(),
            Decision::Reject {
                retry_after_secs: 0
            }
        );
        assert!(tracker.check(&k, 1061).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_success_resets_from_any_state() {
        let store = MemoryStore::new();
        let tracker = tracker(store.clone());
        let k = key("alice");

        for i in 0..4 {
            tracker.on_failure(&k, 1000 + i).await.unwrap();
        }
        tracker.on_success(&k).await.unwrap();

        assert!(tracker.check(&k, 1004).await.unwrap().is_allowed());
        assert!(store.get(&k).await.unwrap().is_none());

        let record = tracker.on_failure(&k, 1005).await.unwrap();
        assert_eq!(record.attempts, 1);

        // Reset while locked works the same way.
        for i in 0..5 {
            tracker.on_failure(&k, 1010 + i).await.unwrap();
        }
        tracker.on_success(&k).await.unwrap();
        assert!(tracker.check(&k, 1015).await.unwrap().is_allowed());

        // And again on an already-clear key.
        tracker.on_success(&k).await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_while_locked_extend_window() {
        let tracker = tracker(MemoryStore::new());
        let k = key("alice");

        for _ in 0..5 {
            tracker.on_failure(&k, 1000).await.unwrap();
        }

        // Probe during lockout at t0+50 refreshes last_attempt.
        tracker.on_failure(&k, 1050).await.unwrap();

        // Would have expired at t0+61 without the probe.
        assert_eq!(
            tracker.check(&k, 1065).await.unwrap(),
            Decision::Reject {
                retry_after_secs: 45
            }
        );
    }

    #[tokio::test]
    async fn test_clock_skew_keeps_full_window() {
        let tracker = tracker(MemoryStore::new());
        let k = key("alice");

        for _ in 0..5 {
            tracker.on_failure(&k, 1000).await.unwrap();
        }

        // Observer clock behind the recording clock: full penalty remains.
        assert_eq!(
            tracker.check(&k, 990).await.unwrap(),
            Decision::Reject {
                retry_after_secs: 60
            }
        );
    }

    #[tokio::test]
    async fn test_store_outage_never_allows() {
        let tracker = LockoutTracker::new(UnavailableStore, 5, 60);
        let k = key("alice");

        let err = tracker.check(&k, 1000).await.unwrap_err();
        assert!(err.is_retryable());

        assert!(tracker.on_failure(&k, 1000).await.is_err());
        assert!(tracker.on_success(&k).await.is_err());
    }

    #[tokio::test]
    async fn test_peek_does_not_transition() {
        let store = MemoryStore::new();
        let tracker = tracker(store.clone());
        let k = key("alice");

        assert!(tracker.peek(&k).await.unwrap().is_none());

        for _ in 0..5 {
            tracker.on_failure(&k, 1000).await.unwrap();
        }

        // Peek past the window leaves the expired record in place; only
        // check() collapses it.
        let record = tracker.peek(&k).await.unwrap().unwrap();
        assert_eq!(record.attempts, 5);
        assert_eq!(store.len().await, 1);
    }
}
