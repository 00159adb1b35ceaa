//! Record encoding on top of [`KvStore`].
//!
//! Records are opaque to the backend; they are encoded with `bincode`, whose
//! output for a given value is identical on every platform.

use crate::{KvStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Typed get/set for any [`KvStore`].
pub trait TypedStore: KvStore {
    fn get_record<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StoreError> {
        self.get(key)?.map(|bytes| decode(&bytes)).transpose()
    }

    fn put_record<T: Serialize>(&self, key: &[u8], value: &T) -> Result<(), StoreError> {
        self.set(key, &encode(value)?)
    }

    /// Decode every record under `prefix`, in key order.
    fn records_with_prefix<T: DeserializeOwned>(
        &self,
        prefix: &[u8],
    ) -> Result<Vec<T>, StoreError> {
        self.iterate_prefix(prefix)?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }
}

impl<S: KvStore + ?Sized> TypedStore for S {}
