//! Inbound observation votes.

use crate::cctx::{CctxStatus, CrossChainTx, InboundParams, OutboundParams};
use crate::error::CrosschainError;
use crate::keeper::CrosschainKeeper;
use crate::messages::MsgVoteInbound;
use interop_observer::{ErrorKind, ObservationType, VoteResponse, VoteType};
use interop_store::KvStore;
use interop_types::{BlockContext, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> CrosschainKeeper<S, V> {
    /// An observer reports a transaction seen on a sender chain.
    ///
    /// The vote that finalizes the ballot creates the CCTX and schedules its
    /// outbound on the receiver chain.
    pub fn vote_inbound(
        &self,
        ctx: &impl BlockContext,
        msg: &MsgVoteInbound,
    ) -> Result<VoteResponse, CrosschainError> {
        let observer = self.observer();
        observer.supported_chain_params(msg.sender_chain_id)?;
        observer.supported_chain_params(msg.receiver_chain_id)?;
        observer.can_vote(&msg.signer)?;

        let index = msg.digest().to_hex();
        if observer.find_ballot(&index)?.is_none()
            && self.is_finalized_inbound(msg.sender_chain_id, &msg.inbound_hash, msg.event_index)?
        {
            return Err(CrosschainError::InboundAlreadyFinalized {
                chain: msg.sender_chain_id,
                hash: msg.inbound_hash.clone(),
                event_index: msg.event_index,
            });
        }

        let outcome = observer.vote_on_ballot(
            ctx,
            msg.sender_chain_id,
            &index,
            ObservationType::InboundTx,
            &msg.signer,
            VoteType::Success,
        )?;
        if outcome.finalized_success() {
            self.finalize_inbound(ctx, msg, &index)?;
        }

        Ok(VoteResponse {
            ballot_created: outcome.is_new,
            vote_finalized: outcome.finalized,
        })
    }

    fn finalize_inbound(
        &self,
        ctx: &impl BlockContext,
        msg: &MsgVoteInbound,
        index: &str,
    ) -> Result<(), CrosschainError> {
        let height = ctx.height();
        let mut cctx = CrossChainTx {
            index: index.to_string(),
            status: CctxStatus::PendingInbound,
            status_message: String::new(),
            last_update_height: height,
            inbound: InboundParams {
                sender: msg.sender.clone(),
                sender_chain_id: msg.sender_chain_id,
                amount: msg.amount,
                observed_hash: msg.inbound_hash.clone(),
                observed_height: msg.inbound_block_height,
                event_index: msg.event_index,
                ballot_index: index.to_string(),
                finalized_height: height,
            },
            outbound: Vec::new(),
        };
        self.add_finalized_inbound(msg.sender_chain_id, &msg.inbound_hash, msg.event_index)?;

        match self
            .observer()
            .schedule_outbound(ctx, msg.receiver_chain_id, index)
        {
            Ok((tss_pubkey, tss_nonce)) => {
                cctx.outbound.push(OutboundParams {
                    receiver: msg.receiver.clone(),
                    receiver_chain_id: msg.receiver_chain_id,
                    amount: msg.amount,
                    tss_pubkey,
                    tss_nonce,
                    ballot_index: None,
                    observed_hash: None,
                    observed_status: None,
                });
                cctx.set_status(CctxStatus::PendingOutbound, "inbound finalized", height);
            }
            Err(e) if e.kind() == ErrorKind::Store => return Err(e.into()),
            Err(e) => {
                tracing::warn!(cctx = %index, error = %e, "cannot schedule outbound, aborting");
                cctx.set_status(CctxStatus::Aborted, e.to_string(), height);
            }
        }

        self.set_cctx(&cctx)?;
        tracing::info!(
            cctx = %index,
            sender_chain = %msg.sender_chain_id,
            receiver_chain = %msg.receiver_chain_id,
            status = %cctx.status,
            "inbound finalized"
        );
        Ok(())
    }
}
