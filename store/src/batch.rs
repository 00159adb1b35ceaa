//! Write batching: buffers every write of one state transition so that it is
//! either applied as a whole or not at all.
//!
//! # Usage
//!
//! ```ignore
//! let batch = WriteBatch::new(&store);
//! handle_message(&batch, msg)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! buffered writes are discarded and the underlying store is untouched.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

use crate::kv::{prefix_upper_bound, KvPair, KvStore, KvWrite};
use crate::StoreError;

/// A read-through overlay over another store.
///
/// Reads see the buffered writes first, then fall back to the inner store.
pub struct WriteBatch<S: KvStore> {
    inner: S,
    pending: Mutex<BTreeMap<Vec<u8>, Option<Vec<u8>>>>,
}

impl<S: KvStore> WriteBatch<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of buffered writes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush every buffered write to the inner store.
    pub fn commit(self) -> Result<(), StoreError> {
        let pending = self
            .pending
            .into_inner()
            .map_err(|_| StoreError::Backend("write batch lock poisoned".into()))?;
        let writes: Vec<KvWrite> = pending.into_iter().collect();
        if writes.is_empty() {
            return Ok(());
        }
        self.inner.apply_writes(writes)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<Vec<u8>, Option<Vec<u8>>>> {
        // A panic while holding the lock leaves the map itself consistent.
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: KvStore> KvStore for WriteBatch<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(buffered) = self.lock().get(key) {
            return Ok(buffered.clone());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.lock().insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.lock().insert(key.to_vec(), None);
        Ok(())
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.inner.iterate_prefix(prefix)?.into_iter().collect();
        let upper = match prefix_upper_bound(prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        let pending = self.lock();
        for (key, value) in pending.range::<Vec<u8>, _>((Bound::Included(prefix.to_vec()), upper)) {
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }
}
