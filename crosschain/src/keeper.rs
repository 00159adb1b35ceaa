//! The crosschain keeper: CCTX records on top of the observer keeper.
//!
//! Cross-chain state shares the observer's store, so that one message
//! updates ballots, nonces and CCTX records in the same write batch.

use crate::cctx::CrossChainTx;
use crate::error::CrosschainError;
use crate::keys;
use interop_observer::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{ChainId, ValidatorRegistry};

pub struct CrosschainKeeper<S, V> {
    observer: ObserverKeeper<S, V>,
}

impl<S: KvStore, V: ValidatorRegistry> CrosschainKeeper<S, V> {
    pub fn new(observer: ObserverKeeper<S, V>) -> Self {
        Self { observer }
    }

    pub fn observer(&self) -> &ObserverKeeper<S, V> {
        &self.observer
    }

    pub fn get_cctx(&self, index: &str) -> Result<Option<CrossChainTx>, CrosschainError> {
        Ok(self.observer.store().get_record(&keys::cctx(index))?)
    }

    pub fn set_cctx(&self, cctx: &CrossChainTx) -> Result<(), CrosschainError> {
        self.observer
            .store()
            .put_record(&keys::cctx(&cctx.index), cctx)?;
        Ok(())
    }

    pub fn all_cctx(&self) -> Result<Vec<CrossChainTx>, CrosschainError> {
        Ok(self.observer.store().records_with_prefix(keys::CCTX)?)
    }

    /// Whether an inbound already produced a CCTX. Outlives the inbound
    /// ballot, which maturity GC removes.
    pub fn is_finalized_inbound(
        &self,
        chain: ChainId,
        hash: &str,
        event_index: u64,
    ) -> Result<bool, CrosschainError> {
        Ok(self
            .observer
            .store()
            .get(&keys::finalized_inbound(chain, hash, event_index))?
            .is_some())
    }

    pub fn add_finalized_inbound(
        &self,
        chain: ChainId,
        hash: &str,
        event_index: u64,
    ) -> Result<(), CrosschainError> {
        self.observer
            .store()
            .set(&keys::finalized_inbound(chain, hash, event_index), &[1])?;
        Ok(())
    }
}
