//! TSS keygen consensus.
//!
//! A keygen is scheduled by an admin for a target height. Every node account
//! reports the outcome with a keygen vote; the ballot requires unanimity.
//! A successful keygen records a new key in the history. It becomes the
//! current key only when there is none yet; later rotations go through
//! [`ObserverKeeper::update_tss`].

use crate::ballot::BallotStatus;
use crate::error::ObserverError;
use crate::keys;
use crate::tss::Tss;
use crate::voting::{BallotTemplate, VoteOutcome};
use crate::ObserverKeeper;
use interop_store::{KvStore, TypedStore};
use interop_types::{AccountAddress, BlockContext, BlockHeight, Threshold, ValidatorRegistry};
use serde::{Deserialize, Serialize};

/// Minimum distance between the current height and a newly scheduled keygen.
pub const KEYGEN_MIN_LEAD_BLOCKS: i64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeygenStatus {
    Pending,
    Success,
    Failed,
}

/// The in-flight (or last) keygen request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keygen {
    pub status: KeygenStatus,
    pub granted_pubkeys: Vec<String>,
    /// Target height; [`BlockHeight::NEVER`] after a failed keygen.
    pub block_number: BlockHeight,
}

/// Ballot identifier of a keygen vote.
pub fn keygen_ballot_id(keygen_height: BlockHeight, tss_pubkey: &str) -> String {
    format!("{keygen_height}-{tss_pubkey}-tss-keygen")
}

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    pub fn get_keygen(&self) -> Result<Option<Keygen>, ObserverError> {
        Ok(self.store().get_record(keys::KEYGEN)?)
    }

    pub fn set_keygen(&self, keygen: &Keygen) -> Result<(), ObserverError> {
        self.store().put_record(keys::KEYGEN, keygen)?;
        Ok(())
    }

    /// Schedule a new keygen at `block` with every node account's granted
    /// pubkey.
    pub fn update_keygen(
        &self,
        ctx: &impl BlockContext,
        signer: &AccountAddress,
        block: BlockHeight,
    ) -> Result<Keygen, ObserverError> {
        self.ensure_admin(signer)?;
        let min = ctx.height().saturating_add(KEYGEN_MIN_LEAD_BLOCKS);
        if block < min {
            return Err(ObserverError::KeygenBlockTooLow {
                block: block.as_i64(),
                min: min.as_i64(),
            });
        }
        let granted_pubkeys = self
            .node_accounts()?
            .into_iter()
            .map(|n| n.granted_pubkey)
            .collect();
        let keygen = Keygen {
            status: KeygenStatus::Pending,
            granted_pubkeys,
            block_number: block,
        };
        self.set_keygen(&keygen)?;
        tracing::info!(block = %block, participants = keygen.granted_pubkeys.len(), "keygen scheduled");
        Ok(keygen)
    }

    /// Keygen ballots are voted by every node account and need unanimity.
    pub fn keygen_ballot_template(&self) -> Result<BallotTemplate, ObserverError> {
        let voters: Vec<AccountAddress> = self
            .node_accounts()?
            .into_iter()
            .map(|n| n.operator)
            .collect();
        if voters.is_empty() {
            return Err(ObserverError::NoNodeAccounts);
        }
        Ok(BallotTemplate {
            voters,
            threshold: Threshold::ONE,
        })
    }

    /// Apply a finalized keygen ballot to the keygen and TSS state.
    ///
    /// Returns whether a new key was recorded. A ballot for another keygen
    /// height, or one that finalizes after the keygen already concluded,
    /// changes nothing.
    pub fn apply_keygen_outcome(
        &self,
        ctx: &impl BlockContext,
        outcome: &VoteOutcome,
        tss_pubkey: &str,
        keygen_height: BlockHeight,
    ) -> Result<bool, ObserverError> {
        if !outcome.finalized {
            return Ok(false);
        }
        let mut keygen = self.get_keygen()?.ok_or(ObserverError::KeygenNotFound)?;
        if keygen.status != KeygenStatus::Pending {
            tracing::debug!(ballot = %outcome.ballot.identifier, "keygen already concluded");
            return Ok(false);
        }
        if keygen.block_number != keygen_height {
            tracing::warn!(
                ballot = %outcome.ballot.identifier,
                ballot_height = %keygen_height,
                keygen_height = %keygen.block_number,
                "keygen ballot is for another keygen"
            );
            return Ok(false);
        }

        match outcome.ballot.status {
            BallotStatus::FinalizedFailure => {
                keygen.status = KeygenStatus::Failed;
                keygen.block_number = BlockHeight::NEVER;
                self.set_keygen(&keygen)?;
                tracing::info!(height = %keygen_height, "keygen failed");
                Ok(false)
            }
            BallotStatus::FinalizedSuccess => {
                let tss = Tss {
                    tss_pubkey: tss_pubkey.to_string(),
                    tss_participant_list: keygen.granted_pubkeys.clone(),
                    operator_address_list: outcome.ballot.voter_list.clone(),
                    keygen_height,
                    finalized_height: ctx.height(),
                };
                keygen.status = KeygenStatus::Success;
                keygen.block_number = ctx.height();
                self.set_keygen(&keygen)?;

                if self.get_tss()?.is_none() {
                    self.set_tss_and_reset_nonces(ctx, &tss)?;
                } else {
                    self.append_tss_history(&tss)?;
                }
                tracing::info!(tss = %tss_pubkey, height = %ctx.height(), "keygen succeeded");
                Ok(true)
            }
            BallotStatus::InProgress => Ok(false),
        }
    }
}
