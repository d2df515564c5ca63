//! In-process attempt store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_common::{AttemptRecord, LockoutKey, WardenError};

use super::AttemptStore;

/// Attempt store held entirely in process memory.
///
/// Suitable for single-process deployments and as a test double. Clones share
/// the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<LockoutKey, AttemptRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn get(&self, key: &LockoutKey) -> Result<Option<AttemptRecord>, WardenError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(&self, key: &LockoutKey, record: &AttemptRecord) -> Result<(), WardenError> {
        self.records
            .write()
            .await
            .insert(key.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, key: &LockoutKey) -> Result<(), WardenError> {
        self.records.write().await.remove(key);
        Ok(())
    }
}
