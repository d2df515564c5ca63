//! Attempt record storage backends.

mod memory;
mod mirror;
mod redis;

pub use self::memory::MemoryStore;
pub use self::mirror::MirroredStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use warden_common::{AttemptRecord, LockoutKey, WardenError};

/// Shared storage for attempt records.
///
/// Unavailability of the backing store must surface as
/// [`WardenError::StoreUnavailable`] (or [`WardenError::Timeout`]), never as
/// an absent record: an outage reported as "no record" would let failed
/// attempts bypass the lockout.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Fetch the current record, or `None` if nothing is recorded for `key`.
    async fn get(&self, key: &LockoutKey) -> Result<Option<AttemptRecord>, WardenError>;

    /// Store `record`, replacing any prior value.
    async fn set(&self, key: &LockoutKey, record: &AttemptRecord) -> Result<(), WardenError>;

    /// Remove the record for `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &LockoutKey) -> Result<(), WardenError>;
}
