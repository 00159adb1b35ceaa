//! Nullable store: thread-safe in-memory key-value storage for testing.

use interop_store::{KvPair, KvStore, StoreError};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Mutex;

/// An in-memory [`KvStore`] backed by an ordered map.
///
/// Writes can be made to fail on demand, to exercise error propagation.
pub struct NullKvStore {
    entries: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
    fail_writes: Mutex<bool>,
}

impl NullKvStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            fail_writes: Mutex::new(false),
        }
    }

    /// Make every subsequent `set`/`delete` return a backend error.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Number of stored keys (for assertions).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry, in key order.
    pub fn dump(&self) -> Vec<KvPair> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Backend("writes disabled".into()));
        }
        Ok(())
    }
}

impl Default for NullKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for NullKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        let entries = self.entries.lock().unwrap();
        let upper = match interop_store::kv::prefix_upper_bound(prefix) {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };
        Ok(entries
            .range::<Vec<u8>, _>((Bound::Included(prefix.to_vec()), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
