//! Process-local mirror over a shared store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_common::constants::DEFAULT_MIRROR_CAPACITY;
use warden_common::{AttemptRecord, LockoutKey, WardenError};

use super::AttemptStore;

/// Store decorator that mirrors recently written records in process memory,
/// saving a round-trip to the shared store on re-reads.
///
/// The mirror is an optimization, not a source of truth. Entries are written
/// only by this store's own `set`/`delete` calls and never populated from
/// `get` results, so the local view of a key is always this process' last
/// write and every subsequent mutation overwrites it. A mirror hit can lag
/// the shared store when another process has since updated or cleared the
/// key; the lag resolves at this process' next mutation of that key.
pub struct MirroredStore<S> {
    inner: S,

    mirror: Arc<RwLock<HashMap<LockoutKey, AttemptRecord>>>,

    /// Bound on mirrored entries; the oldest entry is evicted once full
    capacity: usize,

    /// When false every call passes straight through to the inner store
    enabled: bool,
}

impl<S: AttemptStore> MirroredStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_MIRROR_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            mirror: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
            enabled: true,
        }
    }

    /// Decorator with the mirror disabled; reads and writes hit the inner
    /// store directly.
    pub fn passthrough(inner: S) -> Self {
        Self {
            inner,
            mirror: Arc::new(RwLock::new(HashMap::new())),
            capacity: 1,
            enabled: false,
        }
    }

    /// Number of mirrored entries.
    pub async fn mirrored(&self) -> usize {
        self.mirror.read().await.len()
    }
}

#[async_trait]
impl<S: AttemptStore> AttemptStore for MirroredStore<S> {
    async fn get(&self, key: &LockoutKey) -> Result<Option<AttemptRecord>, WardenError> {
        if self.enabled {
            if let Some(record) = self.mirror.read().await.get(key) {
                return Ok(Some(record.clone()));
            }
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &LockoutKey, record: &AttemptRecord) -> Result<(), WardenError> {
        // Shared store first; the mirror only reflects durable writes.
        self.inner.set(key, record).await?;

        if self.enabled {
            let mut mirror = self.mirror.write().await;
            if !mirror.contains_key(key) && mirror.len() >= self.capacity {
                let oldest = mirror
                    .iter()
                    .min_by_key(|(_, r)| r.last_attempt)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    mirror.remove(&oldest);
                }
            }
            mirror.insert(key.clone(), record.clone());
        }

        Ok(())
    }

    async fn delete(&self, key: &LockoutKey) -> Result<(), WardenError> {
        self.inner.delete(key).await?;

        if self.enabled {
            self.mirror.write().await.remove(key);
        }

        Ok(())
    }
}
