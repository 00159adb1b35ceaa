//! Outbound nonce allocation per (signing key, chain).
//!
//! `ChainNonces.nonce` is the next nonce to hand out. `PendingNonces` tracks
//! the window `low <= n < high` of nonces scheduled but not yet confirmed.
//! Confirmations advance `low` past the confirmed nonce; a confirmation
//! below `low` (arriving out of order) changes nothing, so any nonce it
//! skipped over stays unconfirmed.

use crate::error::ObserverError;
use crate::keys;
use crate::tss::Tss;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{AccountAddress, BlockContext, BlockHeight, ChainId, ValidatorRegistry};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNonces {
    pub tss: String,
    pub chain_id: ChainId,
    pub low: u64,
    pub high: u64,
}

impl PendingNonces {
    pub fn contains(&self, nonce: u64) -> bool {
        self.low <= nonce && nonce < self.high
    }

    pub fn is_empty(&self) -> bool {
        self.low == self.high
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainNonces {
    pub chain_id: ChainId,
    /// Next nonce to assign.
    pub nonce: u64,
    /// Ledger height at which the counter last changed.
    pub finalized_height: BlockHeight,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceToCctx {
    pub tss: String,
    pub chain_id: ChainId,
    pub nonce: u64,
    pub cctx_index: String,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn get_pending_nonces(&self, tss: &str, chain: ChainId) -> Result<Option<PendingNonces>, ObserverError> {
        Ok(self.store().get_record(&keys::pending_nonces(tss, chain))?)
    }

    pub fn set_pending_nonces(&self, pending: &PendingNonces) -> Result<(), ObserverError> {
        self.store()
            .put_record(&keys::pending_nonces(&pending.tss, pending.chain_id), pending)?;
        Ok(())
    }

    pub fn get_chain_nonces(&self, chain: ChainId) -> Result<Option<ChainNonces>, ObserverError> {
        Ok(self.store().get_record(&keys::chain_nonces(chain))?)
    }

    pub fn set_chain_nonces(&self, nonces: &ChainNonces) -> Result<(), ObserverError> {
        self.store()
            .put_record(&keys::chain_nonces(nonces.chain_id), nonces)?;
        Ok(())
    }

    pub fn get_nonce_to_cctx(
        &self,
        tss: &str,
        chain: ChainId,
        nonce: u64,
    ) -> Result<Option<NonceToCctx>, ObserverError> {
        Ok(self
            .store()
            .get_record(&keys::nonce_to_cctx(tss, chain, nonce))?)
    }

    /// Record which cross-chain tx consumed a nonce. Never overwrites.
    pub fn set_nonce_to_cctx(&self, entry: &NonceToCctx) -> Result<(), ObserverError> {
        if let Some(existing) = self.get_nonce_to_cctx(&entry.tss, entry.chain_id, entry.nonce)? {
            return Err(ObserverError::NonceAlreadyAssigned {
                chain: entry.chain_id,
                nonce: entry.nonce,
                cctx_index: existing.cctx_index,
            });
        }
        self.store().put_record(
            &keys::nonce_to_cctx(&entry.tss, entry.chain_id, entry.nonce),
            entry,
        )?;
        Ok(())
    }

    /// Make `tss` the current key, record it in the history, and restart
    /// nonce counters at zero for every supported chain.
    pub fn set_tss_and_reset_nonces(&self, ctx: &impl BlockContext, tss: &Tss) -> Result<(), ObserverError> {
        self.set_tss(tss)?;
        self.append_tss_history(tss)?;
        let chains = self.supported_chains()?;
        for &chain in &chains {
            self.set_chain_nonces(&ChainNonces {
                chain_id: chain,
                nonce: 0,
                finalized_height: ctx.height(),
            })?;
            self.set_pending_nonces(&PendingNonces {
                tss: tss.tss_pubkey.clone(),
                chain_id: chain,
                low: 0,
                high: 0,
            })?;
        }
        tracing::info!(
            tss = %tss.tss_pubkey,
            chains = chains.len(),
            "current TSS set, nonces reset"
        );
        Ok(())
    }

    /// Confirm `nonce`: when it is pending, every nonce up to and including
    /// it leaves the window. Returns the resulting window.
    ///
    /// The window excludes `high`, so confirming `high` itself changes
    /// nothing, unlike a reading of the window as the closed `[low, high]`.
    pub fn remove_from_pending(
        &self,
        tss: &str,
        chain: ChainId,
        nonce: u64,
    ) -> Result<PendingNonces, ObserverError> {
        let mut pending = self
            .get_pending_nonces(tss, chain)?
            .ok_or(ObserverError::PendingNoncesNotFound(chain))?;
        if pending.contains(nonce) {
            pending.low = nonce + 1;
            self.set_pending_nonces(&pending)?;
        } else {
            tracing::debug!(
                chain = %chain,
                nonce,
                low = pending.low,
                high = pending.high,
                "confirmed nonce outside pending window"
            );
        }
        Ok(pending)
    }

    /// Administrative override of a chain's nonce state. The next nonce to
    /// assign becomes `high`, the pending window becomes `[low, high)`.
    /// Applying the same reset twice leaves the same state.
    pub fn reset_nonces(
        &self,
        ctx: &impl BlockContext,
        signer: &AccountAddress,
        tss: &str,
        chain: ChainId,
        low: u64,
        high: u64,
    ) -> Result<(), ObserverError> {
        self.ensure_admin(signer)?;
        if low > high {
            return Err(ObserverError::InvalidNonceRange { low, high });
        }
        if self.get_tss()?.is_none() {
            return Err(ObserverError::TssNotFound);
        }
        if self.find_tss_in_history(tss)?.is_none() {
            return Err(ObserverError::TssNotInHistory(tss.to_string()));
        }
        self.supported_chain_params(chain)?;

        self.set_chain_nonces(&ChainNonces {
            chain_id: chain,
            nonce: high,
            finalized_height: ctx.height(),
        })?;
        self.set_pending_nonces(&PendingNonces {
            tss: tss.to_string(),
            chain_id: chain,
            low,
            high,
        })?;
        tracing::info!(chain = %chain, tss, low, high, "chain nonces reset");
        Ok(())
    }

    /// Assign the next nonce of `chain` under the current key to
    /// `cctx_index`, and add it to the pending window.
    pub fn schedule_outbound(
        &self,
        ctx: &impl BlockContext,
        chain: ChainId,
        cctx_index: &str,
    ) -> Result<(String, u64), ObserverError> {
        let tss = self.current_tss()?;
        self.supported_chain_params(chain)?;
        let mut chain_nonces = self
            .get_chain_nonces(chain)?
            .ok_or(ObserverError::ChainNoncesNotFound(chain))?;
        let mut pending = self
            .get_pending_nonces(&tss.tss_pubkey, chain)?
            .ok_or(ObserverError::PendingNoncesNotFound(chain))?;

        let nonce = chain_nonces.nonce;
        self.set_nonce_to_cctx(&NonceToCctx {
            tss: tss.tss_pubkey.clone(),
            chain_id: chain,
            nonce,
            cctx_index: cctx_index.to_string(),
        })?;

        chain_nonces.nonce = nonce + 1;
        chain_nonces.finalized_height = ctx.height();
        self.set_chain_nonces(&chain_nonces)?;

        pending.high = pending.high.max(nonce + 1);
        self.set_pending_nonces(&pending)?;

        tracing::debug!(chain = %chain, nonce, cctx = cctx_index, "outbound scheduled");
        Ok((tss.tss_pubkey, nonce))
    }
}
