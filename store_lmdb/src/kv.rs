//! LMDB implementation of [`KvStore`].
//!
//! Each call runs in its own LMDB transaction. LMDB keeps keys in
//! lexicographic byte order, which gives `iterate_prefix` its ordering.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use interop_store::{KvPair, KvStore, KvWrite, StoreError};

use crate::LmdbError;

#[derive(Clone)]
pub struct LmdbKvStore {
    pub(crate) env: Arc<Env>,
    pub(crate) db: Database<Bytes, Bytes>,
}

impl KvStore for LmdbKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self.db.get(&rtxn, key).map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.put(&mut wtxn, key, value).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iterate_prefix(&self, prefix: &[u8]) -> Result<Vec<KvPair>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.db.prefix_iter(&rtxn, prefix).map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            let (key, val) = entry.map_err(LmdbError::from)?;
            results.push((key.to_vec(), val.to_vec()));
        }
        Ok(results)
    }

    /// All writes go through one LMDB transaction: either every write lands
    /// or none does.
    fn apply_writes(&self, writes: Vec<KvWrite>) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for (key, value) in &writes {
            match value {
                Some(value) => self.db.put(&mut wtxn, key, value),
                None => self.db.delete(&mut wtxn, key).map(|_| ()),
            }
            .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
