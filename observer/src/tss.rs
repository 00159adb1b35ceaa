//! TSS signing keys: the current key and the append-only key history.

use crate::error::ObserverError;
use crate::keys;
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{AccountAddress, BlockContext, BlockHeight, ValidatorRegistry};
use serde::{Deserialize, Serialize};

/// A threshold signing key produced by a successful keygen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tss {
    pub tss_pubkey: String,
    /// Granted pubkeys of the keygen participants.
    pub tss_participant_list: Vec<String>,
    /// Operators that voted the keygen through.
    pub operator_address_list: Vec<AccountAddress>,
    /// Height the keygen was scheduled for.
    pub keygen_height: BlockHeight,
    /// Height the keygen ballot finalized at.
    pub finalized_height: BlockHeight,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    /// The current signing key, if any keygen has been promoted yet.
    pub fn get_tss(&self) -> Result<Option<Tss>, ObserverError> {
        Ok(self.store().get_record(keys::TSS)?)
    }

    pub fn current_tss(&self) -> Result<Tss, ObserverError> {
        self.get_tss()?.ok_or(ObserverError::TssNotFound)
    }

    /// Overwrite the current key. Use [`Self::set_tss_and_reset_nonces`] to
    /// rotate keys; this does not touch nonce state.
    pub fn set_tss(&self, tss: &Tss) -> Result<(), ObserverError> {
        self.store().put_record(keys::TSS, tss)?;
        Ok(())
    }

    /// Append `tss` to the history unless its pubkey is already recorded.
    pub fn append_tss_history(&self, tss: &Tss) -> Result<bool, ObserverError> {
        if self.find_tss_in_history(&tss.tss_pubkey)?.is_some() {
            return Ok(false);
        }
        self.store().put_record(
            &keys::tss_history(tss.finalized_height, &tss.tss_pubkey),
            tss,
        )?;
        Ok(true)
    }

    /// Every key ever finalized, ordered by finalization height.
    pub fn tss_history(&self) -> Result<Vec<Tss>, ObserverError> {
        Ok(self.store().records_with_prefix(keys::TSS_HISTORY)?)
    }

    pub fn find_tss_in_history(&self, pubkey: &str) -> Result<Option<Tss>, ObserverError> {
        Ok(self
            .tss_history()?
            .into_iter()
            .find(|t| t.tss_pubkey == pubkey))
    }

    /// The most recently finalized key at or before `height`.
    pub fn tss_at_height(&self, height: BlockHeight) -> Result<Option<Tss>, ObserverError> {
        Ok(self
            .tss_history()?
            .into_iter()
            .take_while(|t| t.finalized_height <= height)
            .last())
    }

    /// Promote a key from the history to current. Nonce counters restart
    /// under the new key.
    pub fn update_tss(
        &self,
        ctx: &impl BlockContext,
        signer: &AccountAddress,
        tss_pubkey: &str,
    ) -> Result<Tss, ObserverError> {
        self.ensure_admin(signer)?;
        let tss = self
            .find_tss_in_history(tss_pubkey)?
            .ok_or_else(|| ObserverError::TssNotInHistory(tss_pubkey.to_string()))?;
        if self.get_tss()?.is_some_and(|current| current.tss_pubkey == tss_pubkey) {
            return Ok(tss);
        }
        self.set_tss_and_reset_nonces(ctx, &tss)?;
        Ok(tss)
    }
}
