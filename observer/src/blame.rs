//! Keysign blame records: which participants caused a signing round to fail.

use crate::error::ObserverError;
use crate::keys;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{ChainId, ValidatorRegistry};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBlame {
    pub pubkey: String,
    #[serde(default)]
    pub blame_data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blame {
    /// `"{chain}-{nonce}-{digest}"`, see [`blame_index`].
    pub index: String,
    pub chain_id: ChainId,
    pub nonce: u64,
    /// Digest of the payload the failed round was signing.
    pub digest: String,
    pub failure_reason: String,
    pub nodes: Vec<NodeBlame>,
}

pub fn blame_index(chain: ChainId, nonce: u64, digest: &str) -> String {
    format!("{chain}-{nonce}-{digest}")
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn get_blame(&self, index: &str) -> Result<Option<Blame>, ObserverError> {
        Ok(self.store().get_record(&keys::blame(index))?)
    }

    pub fn set_blame(&self, blame: &Blame) -> Result<(), ObserverError> {
        self.store().put_record(&keys::blame(&blame.index), blame)?;
        Ok(())
    }

    pub fn all_blames(&self) -> Result<Vec<Blame>, ObserverError> {
        Ok(self.store().records_with_prefix(keys::BLAME)?)
    }

    pub fn blames_for_chain(&self, chain: ChainId) -> Result<Vec<Blame>, ObserverError> {
        Ok(self
            .all_blames()?
            .into_iter()
            .filter(|b| b.chain_id == chain)
            .collect())
    }
}
