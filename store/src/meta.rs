//! Schema bookkeeping stored alongside the module state.

use crate::{KvStore, StoreError};

const SCHEMA_VERSION_KEY: &[u8] = b"meta/schema_version";
const LAST_BLOCK_HEIGHT_KEY: &[u8] = b"meta/last_block_height";

/// Database metadata on top of any [`KvStore`].
pub trait MetaStore: KvStore {
    /// The stored schema version; `0` for a fresh database.
    fn get_schema_version(&self) -> Result<u32, StoreError> {
        match self.get(SCHEMA_VERSION_KEY)? {
            Some(bytes) if bytes.len() == 4 => {
                let mut arr = [0u8; 4];
                arr.copy_from_slice(&bytes);
                Ok(u32::from_le_bytes(arr))
            }
            Some(_) => Err(StoreError::Corruption(
                "schema_version has unexpected byte length".to_string(),
            )),
            None => Ok(0),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.set(SCHEMA_VERSION_KEY, &version.to_le_bytes())
    }

    /// Height of the last block whose end-of-block processing committed.
    fn get_last_block_height(&self) -> Result<Option<i64>, StoreError> {
        match self.get(LAST_BLOCK_HEIGHT_KEY)? {
            Some(bytes) if bytes.len() == 8 => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&bytes);
                Ok(Some(i64::from_le_bytes(arr)))
            }
            Some(_) => Err(StoreError::Corruption(
                "last_block_height has unexpected byte length".to_string(),
            )),
            None => Ok(None),
        }
    }

    fn set_last_block_height(&self, height: i64) -> Result<(), StoreError> {
        self.set(LAST_BLOCK_HEIGHT_KEY, &height.to_le_bytes())
    }
}

impl<S: KvStore + ?Sized> MetaStore for S {}
