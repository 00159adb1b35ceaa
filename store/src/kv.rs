//! The raw key-value interface consumed by every subsystem.

use crate::StoreError;
use std::sync::Arc;

/// A key and its value, as returned by prefix iteration.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// A buffered write: `Some(value)` sets the key, `None` deletes it.
pub type KvWrite = (Vec<u8>, Option<Vec<u8>>);

/// Byte-oriented key-value store.
///
/// Methods take `&self`: backends provide their own interior mutability.
/// The observer core executes one message at a time, so no two calls ever
/// race on the same key.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError>;

    /// Apply a set of writes in order. Backends with transactions override
    /// this to make the whole set atomic.
    fn apply_writes(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        for (key, value) in writes {
            match value {
                Some(value) => self.set(&key, &value)?,
                None => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        (**self).iterate_prefix(prefix)
    }

    fn apply_writes(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        (**self).apply_writes(writes)
    }
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        (**self).iterate_prefix(prefix)
    }

    fn apply_writes(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        (**self).apply_writes(writes)
    }
}

/// Smallest byte string greater than every key starting with `prefix`,
/// or `None` when the prefix is all `0xff` (unbounded above).
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}
