//! Redis-backed attempt store.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use warden_common::constants::redis_keys::ATTEMPT_PREFIX;
use warden_common::{AttemptRecord, LockoutKey, WardenError};

use super::AttemptStore;

/// Attempt store backed by a shared Redis instance.
///
/// Records are stored as JSON strings with a TTL. The TTL is storage hygiene,
/// not policy: the tracker re-validates the penalty window itself, so it must
/// be at least as long as the penalty.
#[derive(Clone)]
pub struct RedisStore {
    /// Redis connection manager (auto-reconnecting)
    conn: ConnectionManager,

    /// Record TTL in seconds
    ttl_secs: u64,
}

impl RedisStore {
    /// Connect to Redis at `url`.
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self, WardenError> {
        let client = redis::Client::open(url)
            .map_err(|e| WardenError::Config(format!("Invalid Redis URL: {e}")))?;

        let conn = ConnectionManager::new(client).await.map_err(store_err)?;

        tracing::info!(url = %url, "Redis connected");

        Ok(Self { conn, ttl_secs })
    }

    fn redis_key(key: &LockoutKey) -> String {
        format!("{}{}", ATTEMPT_PREFIX, key)
    }
}

#[async_trait]
impl AttemptStore for RedisStore {
    async fn get(&self, key: &LockoutKey) -> Result<Option<AttemptRecord>, WardenError> {
        let mut conn = self.conn.clone();
        let data: Option<String> = conn.get(Self::redis_key(key)).await.map_err(store_err)?;

        match data {
            Some(d) => {
                let record =
                    serde_json::from_str(&d).map_err(|e| WardenError::Encoding(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &LockoutKey, record: &AttemptRecord) -> Result<(), WardenError> {
        let mut conn = self.conn.clone();
        let data =
            serde_json::to_string(record).map_err(|e| WardenError::Encoding(e.to_string()))?;

        conn.set_ex::<_, _, ()>(Self::redis_key(key), data, self.ttl_secs)
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn delete(&self, key: &LockoutKey) -> Result<(), WardenError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::redis_key(key)).await.map_err(store_err)?;
        Ok(())
    }
}

/// Map a Redis failure onto the tracking-layer taxonomy. Timeouts stay
/// distinct in logs but callers treat both variants as a hard store failure.
fn store_err(err: redis::RedisError) -> WardenError {
    if err.is_timeout() {
        WardenError::Timeout(err.to_string())
    } else {
        WardenError::StoreUnavailable(err.to_string())
    }
}
