//! # Warden - Failed-Attempt Lockout Engine
//!
//! Wraps any validation step and enforces a temporary penalty after too many
//! consecutive failures for a given identity key. Warden does not validate
//! anything itself; the wrapped check is an opaque collaborator that succeeds
//! or fails.
//!
//! ## Architecture
//! ```text
//! Caller → Guard → LockoutTracker → AttemptStore (mirror → Redis)
//! ```
//!
//! A caller derives a key from the identity being validated, asks the tracker
//! whether the attempt is currently blocked, runs the wrapped validation only
//! if not, and reports the outcome back (success → reset, failure → record).

pub mod config;
pub mod guard;
pub mod keys;
pub mod store;
pub mod tracker;

pub use self::config::AppConfig;
pub use guard::{Guard, GuardError};
pub use keys::KeyDeriver;
pub use store::{AttemptStore, MemoryStore, MirroredStore, RedisStore};
pub use tracker::LockoutTracker;
pub use warden_common::{AttemptRecord, Decision, KeyState, LockoutKey, WardenError};

/// Assemble a [`Guard`] over a (mirrored) Redis store from `config`.
pub async fn from_config(
    config: &AppConfig,
) -> Result<Guard<MirroredStore<RedisStore>>, WardenError> {
    let redis = RedisStore::connect(&config.redis_url, config.record_ttl()).await?;

    let store = if config.mirror.enabled {
        MirroredStore::with_capacity(redis, config.mirror.capacity)
    } else {
        MirroredStore::passthrough(redis)
    };

    let tracker = LockoutTracker::new(
        store,
        config.lockout.allowed_attempts,
        config.lockout.penalty_seconds,
    );

    Ok(Guard::new(
        tracker,
        KeyDeriver::new(config.key_namespace.clone()),
    ))
}
