//! Block headers of connected chains, recorded once observers agree on them.

use crate::error::ObserverError;
use crate::keys;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{ChainId, Digest, ValidatorRegistry};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeaderRecord {
    pub chain_id: ChainId,
    /// Lowercase hex digest of `header`.
    pub block_hash: String,
    pub height: i64,
    pub header: Vec<u8>,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn get_block_header(&self, chain: ChainId, block_hash: &str) -> Result<Option<BlockHeaderRecord>, ObserverError> {
        Ok(self
            .store()
            .get_record(&keys::block_header(chain, block_hash))?)
    }

    pub fn set_block_header(&self, record: &BlockHeaderRecord) -> Result<(), ObserverError> {
        self.store().put_record(
            &keys::block_header(record.chain_id, &record.block_hash),
            record,
        )?;
        Ok(())
    }

    /// Validate a header proposed for voting: the hash must identify the
    /// header bytes and the header must not be recorded already.
    pub fn check_new_block_header(&self, record: &BlockHeaderRecord) -> Result<(), ObserverError> {
        if record.header.is_empty() {
            return Err(ObserverError::InvalidBlockHeader("empty header".into()));
        }
        if record.height < 0 {
            return Err(ObserverError::InvalidBlockHeader(format!(
                "negative height {}",
                record.height
            )));
        }
        let expected = Digest::of(&record.header).to_hex();
        if expected != record.block_hash {
            return Err(ObserverError::InvalidBlockHeader(format!(
                "hash {} does not match header digest {expected}",
                record.block_hash
            )));
        }
        if self
            .get_block_header(record.chain_id, &record.block_hash)?
            .is_some()
        {
            return Err(ObserverError::BlockHeaderAlreadyExists(
                record.block_hash.clone(),
            ));
        }
        Ok(())
    }
}
