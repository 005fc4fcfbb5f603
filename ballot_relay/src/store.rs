use crate::*;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

/// Store-assigned identifier of a queued key
pub type KeyId = i64;

/// A voting key waiting to be registered on the ledger
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingKey {
    pub id: KeyId,
    pub key: String,
}

// Keys are secrets, keep them out of logs
impl fmt::Debug for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PendingKey")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Result of `KeyStore::try_register`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub inserted: bool,
}

/// A persistent queue of pending voting keys
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Queue a key, unless the same key value is already queued
    async fn try_register(&self, key: &str) -> Result<Registration, StoreError>;

    /// Get up to `limit` pending keys in insertion order
    async fn take_batch(&self, limit: usize) -> Result<Vec<PendingKey>, StoreError>;

    /// Remove the given keys. Unknown ids are ignored.
    async fn delete_by_ids(&self, ids: &[KeyId]) -> Result<(), StoreError>;

    /// Number of pending keys
    async fn len(&self) -> Result<usize, StoreError>;

    /// Take up to `limit` keys and remove them from the store, but only if at least `min_size`
    /// keys were found. Otherwise nothing is removed and an empty batch is returned.
    ///
    /// The default implementation is a `take_batch` followed by `delete_by_ids` and is only
    /// atomic when callers serialize claims. Stores that can do better should override it.
    async fn claim_batch(
        &self,
        limit: usize,
        min_size: usize,
    ) -> Result<Vec<PendingKey>, StoreError> {
        let batch = self.take_batch(limit).await?;
        if batch.is_empty() || batch.len() < min_size {
            return Ok(vec![]);
        }

        let ids: Vec<KeyId> = batch.iter().map(|pending| pending.id).collect();
        self.delete_by_ids(&ids).await?;
        Ok(batch)
    }
}

/// A simple key store that uses an in-memory BTreeMap
#[derive(Default)]
pub struct MemKeyStore {
    inner: Mutex<MemInner>,
}

#[derive(Default)]
struct MemInner {
    last_id: KeyId,
    keys: BTreeMap<KeyId, String>,
}

impl MemKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MemInner) -> T) -> Result<T, StoreError> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut inner))
    }
}

#[async_trait]
impl KeyStore for MemKeyStore {
    async fn try_register(&self, key: &str) -> Result<Registration, StoreError> {
        self.with_inner(|inner| {
            if inner.keys.values().any(|existing| existing == key) {
                return Registration { inserted: false };
            }
            inner.last_id += 1;
            let id = inner.last_id;
            inner.keys.insert(id, key.to_owned());
            Registration { inserted: true }
        })
    }

    async fn take_batch(&self, limit: usize) -> Result<Vec<PendingKey>, StoreError> {
        self.with_inner(|inner| {
            inner
                .keys
                .iter()
                .take(limit)
                .map(|(id, key)| PendingKey {
                    id: *id,
                    key: key.clone(),
                })
                .collect()
        })
    }

    async fn delete_by_ids(&self, ids: &[KeyId]) -> Result<(), StoreError> {
        self.with_inner(|inner| {
            for id in ids {
                inner.keys.remove(id);
            }
        })
    }

    async fn len(&self) -> Result<usize, StoreError> {
        self.with_inner(|inner| inner.keys.len())
    }

    // Take and delete under one lock
    async fn claim_batch(
        &self,
        limit: usize,
        min_size: usize,
    ) -> Result<Vec<PendingKey>, StoreError> {
        self.with_inner(|inner| {
            let ids: Vec<KeyId> = inner.keys.keys().take(limit).copied().collect();
            if ids.is_empty() || ids.len() < min_size {
                return vec![];
            }

            ids.into_iter()
                .filter_map(|id| inner.keys.remove(&id).map(|key| PendingKey { id, key }))
                .collect()
        })
    }
}
