//! Shared constants for Warden components.

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Consecutive failures tolerated before a key is locked
pub const DEFAULT_ALLOWED_ATTEMPTS: u32 = 5;

/// Penalty window in seconds once the threshold is reached
pub const DEFAULT_PENALTY_SECS: u64 = 60;

/// Record expiry hint for the shared store (1 hour). Storage hygiene only;
/// the decision logic re-validates the time window itself.
pub const DEFAULT_RECORD_TTL_SECS: u64 = 3600;

/// Maximum entries held by the process-local mirror
pub const DEFAULT_MIRROR_CAPACITY: usize = 1024;

/// Namespace mixed into every identity value before hashing
pub const DEFAULT_KEY_NAMESPACE: &str = "warden";

/// Redis key prefixes
pub mod redis_keys {
    /// Attempt records: attempt:{digest}
    pub const ATTEMPT_PREFIX: &str = "attempt:";
}
