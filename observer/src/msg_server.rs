//! Message handlers of the observer module.
//!
//! Each handler validates its signer, runs the voting engine or the
//! administrative operation, then applies the flow's side effect by matching
//! on the vote outcome.

use crate::ballot::{ObservationType, VoteType};
use crate::block_header::BlockHeaderRecord;
use crate::error::ObserverError;
use crate::keygen::keygen_ballot_id;
use crate::messages::{
    MsgAddBlameVote, MsgAddObserver, MsgRemoveObserver, MsgResetChainNonces, MsgUpdateChainParams,
    MsgUpdateKeygen, MsgUpdateObserver, MsgUpdateTss, MsgVoteBlockHeader, MsgVoteTss,
    ObserverUpdateReason, VoteResponse, VoteTssResponse,
};
use crate::node_account::{NodeAccount, NodeStatus};
use crate::voting::BallotTemplate;
use crate::ObserverKeeper;
use interop_store::KvStore;
use interop_types::{AccountAddress, BlockContext, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    /// A node account reports the outcome of a keygen.
    ///
    /// Votes are accepted even after the keygen concluded; they only finalize
    /// the ballot without touching keygen or TSS state.
    pub fn vote_tss(&self, ctx: &impl BlockContext, msg: &MsgVoteTss) -> Result<VoteTssResponse, ObserverError> {
        if self.get_node_account(&msg.signer)?.is_none() {
            return Err(ObserverError::InvalidSigner(msg.signer.to_string()));
        }
        if self.get_keygen()?.is_none() {
            return Err(ObserverError::KeygenNotFound);
        }

        let identifier = keygen_ballot_id(msg.keygen_height, &msg.tss_pubkey);
        let outcome = self.vote_on_ballot_with(
            ctx,
            &identifier,
            ObservationType::TssKeygen,
            &msg.signer,
            msg.status.into(),
            || self.keygen_ballot_template(),
        )?;
        let keygen_success =
            self.apply_keygen_outcome(ctx, &outcome, &msg.tss_pubkey, msg.keygen_height)?;

        Ok(VoteTssResponse {
            ballot_created: outcome.is_new,
            vote_finalized: outcome.finalized,
            keygen_success,
        })
    }

    /// An observer reports the participants blamed for a failed keysign.
    pub fn add_blame_vote(&self, ctx: &impl BlockContext, msg: &MsgAddBlameVote) -> Result<VoteResponse, ObserverError> {
        self.supported_chain_params(msg.chain_id)?;
        self.can_vote(&msg.signer)?;

        let identifier = msg.ballot_digest().to_hex();
        let threshold = self.params().blame_threshold;
        let outcome = self.vote_on_ballot_with(
            ctx,
            &identifier,
            ObservationType::TssKeysign,
            &msg.signer,
            VoteType::Success,
            || {
                Ok(BallotTemplate {
                    voters: self.current_voters()?,
                    threshold,
                })
            },
        )?;
        if outcome.finalized_success() {
            let blame = msg.to_blame();
            self.set_blame(&blame)?;
            tracing::info!(index = %blame.index, nodes = blame.nodes.len(), "blame recorded");
        }

        Ok(VoteResponse {
            ballot_created: outcome.is_new,
            vote_finalized: outcome.finalized,
        })
    }

    /// An observer reports a block header of a connected chain.
    pub fn vote_block_header(
        &self,
        ctx: &impl BlockContext,
        msg: &MsgVoteBlockHeader,
    ) -> Result<VoteResponse, ObserverError> {
        self.supported_chain_params(msg.chain_id)?;
        self.can_vote(&msg.signer)?;

        let record = BlockHeaderRecord {
            chain_id: msg.chain_id,
            block_hash: msg.block_hash.clone(),
            height: msg.height,
            header: msg.header.clone(),
        };
        self.check_new_block_header(&record)?;

        let identifier = msg.ballot_digest().to_hex();
        let outcome = self.vote_on_ballot(
            ctx,
            msg.chain_id,
            &identifier,
            ObservationType::BlockHeader,
            &msg.signer,
            VoteType::Success,
        )?;
        if outcome.finalized_success() {
            self.set_block_header(&record)?;
            tracing::info!(chain = %record.chain_id, height = record.height, hash = %record.block_hash, "block header recorded");
        }

        Ok(VoteResponse {
            ballot_created: outcome.is_new,
            vote_finalized: outcome.finalized,
        })
    }

    /// Move an observer to a new address, carrying its node account along.
    pub fn update_observer(&self, ctx: &impl BlockContext, msg: &MsgUpdateObserver) -> Result<(), ObserverError> {
        let old = &msg.old_observer_address;
        let new = &msg.new_observer_address;
        match msg.update_reason {
            ObserverUpdateReason::Tombstoned => {
                if msg.signer != *old {
                    return Err(ObserverError::NotAuthorized(msg.signer.to_string()));
                }
                if !self.is_operator_tombstoned(old)? {
                    return Err(ObserverError::UpdateObserver(format!(
                        "{old} is not tombstoned"
                    )));
                }
            }
            ObserverUpdateReason::AdminUpdate => self.ensure_admin(&msg.signer)?,
        }
        AccountAddress::parse(new.as_str())?;
        if !self.is_observer(old)? {
            return Err(ObserverError::NotObserver(old.to_string()));
        }
        if self.is_observer(new)? {
            return Err(ObserverError::UpdateObserver(format!(
                "{new} is already an observer"
            )));
        }
        let mut node_account = self
            .get_node_account(old)?
            .ok_or_else(|| ObserverError::NodeAccountNotFound(old.to_string()))?;
        let mut last_count = self
            .get_last_observer_count()?
            .ok_or(ObserverError::LastObserverCountNotFound)?;

        self.update_observer_address(old, new)?;
        self.remove_node_account(old)?;
        node_account.operator = new.clone();
        self.set_node_account(&node_account)?;

        let set_len = self.get_observer_set()?.map(|s| s.len()).unwrap_or(0) as u64;
        last_count.count = set_len;
        last_count.last_change_height = ctx.height();
        self.set_last_observer_count(&last_count)?;

        tracing::info!(old = %old, new = %new, reason = ?msg.update_reason, "observer updated");
        Ok(())
    }

    /// Register a node account and, unless asked not to, add it to the
    /// observer set. Returns the observer set size.
    pub fn add_observer(&self, ctx: &impl BlockContext, msg: &MsgAddObserver) -> Result<u64, ObserverError> {
        self.ensure_admin(&msg.signer)?;
        AccountAddress::parse(msg.observer_address.as_str())?;
        self.set_node_account(&NodeAccount {
            operator: msg.observer_address.clone(),
            granted_pubkey: msg.granted_pubkey.clone(),
            status: NodeStatus::Active,
        })?;
        if msg.add_node_account_only {
            return Ok(self.get_observer_set()?.map(|s| s.len()).unwrap_or(0) as u64);
        }
        self.add_observer_to_set(ctx, &msg.observer_address)
    }

    /// Remove an observer from the set. Its node account is kept, so it
    /// still takes part in keygen.
    pub fn remove_observer(&self, ctx: &impl BlockContext, msg: &MsgRemoveObserver) -> Result<u64, ObserverError> {
        self.ensure_admin(&msg.signer)?;
        self.remove_observer_from_set(ctx, &msg.observer_address)
    }

    /// Admin recovery of a chain's nonces under the current key.
    pub fn reset_chain_nonces(&self, ctx: &impl BlockContext, msg: &MsgResetChainNonces) -> Result<(), ObserverError> {
        self.ensure_admin(&msg.signer)?;
        let tss = self.current_tss()?;
        self.reset_nonces(
            ctx,
            &msg.signer,
            &tss.tss_pubkey,
            msg.chain_id,
            msg.nonce_low,
            msg.nonce_high,
        )
    }

    pub fn handle_update_tss(&self, ctx: &impl BlockContext, msg: &MsgUpdateTss) -> Result<(), ObserverError> {
        self.update_tss(ctx, &msg.signer, &msg.tss_pubkey)?;
        Ok(())
    }

    pub fn handle_update_keygen(&self, ctx: &impl BlockContext, msg: &MsgUpdateKeygen) -> Result<(), ObserverError> {
        self.update_keygen(ctx, &msg.signer, msg.block)?;
        Ok(())
    }

    /// Insert or replace one chain's params.
    pub fn update_chain_params(&self, msg: &MsgUpdateChainParams) -> Result<(), ObserverError> {
        self.ensure_admin(&msg.signer)?;
        let mut list = self.get_chain_params_list()?.unwrap_or_default();
        list.upsert(msg.chain_params.clone());
        self.set_chain_params_list(&list)?;
        tracing::info!(
            chain = %msg.chain_params.chain_id,
            supported = msg.chain_params.is_supported,
            threshold = %msg.chain_params.ballot_threshold,
            "chain params updated"
        );
        Ok(())
    }
}
