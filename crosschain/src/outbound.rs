//! Outbound observation votes.

use crate::cctx::{CctxStatus, CrossChainTx, OutboundParams};
use crate::error::CrosschainError;
use crate::keeper::CrosschainKeeper;
use crate::messages::MsgVoteOutbound;
use interop_observer::{ErrorKind, ObservationType, ReceiveStatus, VoteResponse, VoteType};
use interop_store::KvStore;
use interop_types::{BlockContext, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> CrosschainKeeper<S, V> {
    /// An observer reports the result of an outbound it watched on the
    /// receiver chain.
    ///
    /// The observed status is the vote: a failed receipt is a `Failure` vote,
    /// so a failure finalizes once its share exceeds `1 - threshold`. The
    /// vote that finalizes the ballot confirms the nonce (removing it from
    /// the pending window) and advances the CCTX according to the ballot's
    /// final status. Finalizing a ballot for a CCTX that already reached a
    /// terminal status is an error, which discards the vote.
    pub fn vote_outbound(
        &self,
        ctx: &impl BlockContext,
        msg: &MsgVoteOutbound,
    ) -> Result<VoteResponse, CrosschainError> {
        let mut cctx = self.validate_outbound(msg)?;
        self.observer().can_vote(&msg.signer)?;

        let index = msg.digest().to_hex();
        let outcome = self.observer().vote_on_ballot(
            ctx,
            msg.outbound_chain_id,
            &index,
            ObservationType::OutboundTx,
            &msg.signer,
            VoteType::from(msg.status),
        )?;
        if outcome.finalized {
            let observed = if outcome.finalized_success() {
                ReceiveStatus::Success
            } else {
                ReceiveStatus::Failed
            };
            self.finalize_outbound(ctx, &mut cctx, msg, observed, &index)?;
        }

        Ok(VoteResponse {
            ballot_created: outcome.is_new,
            vote_finalized: outcome.finalized,
        })
    }

    /// The CCTX exists and the vote refers to its current outbound attempt.
    pub fn validate_outbound(&self, msg: &MsgVoteOutbound) -> Result<CrossChainTx, CrosschainError> {
        let cctx = self
            .get_cctx(&msg.cctx_index)?
            .ok_or_else(|| CrosschainError::CctxNotFound(msg.cctx_index.clone()))?;
        let current = cctx
            .current_outbound()
            .ok_or_else(|| CrosschainError::NoPendingOutbound {
                index: cctx.index.clone(),
                status: cctx.status.to_string(),
            })?;
        if current.tss_nonce != msg.tss_nonce {
            return Err(CrosschainError::NonceMismatch {
                index: cctx.index.clone(),
                expected: current.tss_nonce,
                got: msg.tss_nonce,
            });
        }
        self.observer().current_tss()?;
        if current.receiver_chain_id != msg.outbound_chain_id {
            return Err(CrosschainError::ChainMismatch {
                index: cctx.index.clone(),
                expected: current.receiver_chain_id,
                got: msg.outbound_chain_id,
            });
        }
        Ok(cctx)
    }

    fn finalize_outbound(
        &self,
        ctx: &impl BlockContext,
        cctx: &mut CrossChainTx,
        msg: &MsgVoteOutbound,
        observed: ReceiveStatus,
        ballot_index: &str,
    ) -> Result<(), CrosschainError> {
        if !cctx.status.awaits_outbound() {
            return Err(CrosschainError::CctxAlreadyFinalized {
                index: cctx.index.clone(),
                status: cctx.status.to_string(),
            });
        }
        let height = ctx.height();
        let (tss, chain, nonce) = match cctx.current_outbound_mut() {
            Some(current) => {
                current.ballot_index = Some(ballot_index.to_string());
                current.observed_hash = Some(msg.outbound_hash.clone());
                current.observed_status = Some(observed);
                (current.tss_pubkey.clone(), current.receiver_chain_id, current.tss_nonce)
            }
            None => {
                return Err(CrosschainError::NoPendingOutbound {
                    index: cctx.index.clone(),
                    status: cctx.status.to_string(),
                })
            }
        };
        self.observer().remove_from_pending(&tss, chain, nonce)?;

        let old_status = cctx.status;
        match (observed, old_status) {
            (ReceiveStatus::Success, CctxStatus::PendingRevert) => {
                cctx.set_status(CctxStatus::Reverted, "revert executed", height)
            }
            (ReceiveStatus::Success, _) => {
                cctx.set_status(CctxStatus::OutboundMined, "outbound mined", height)
            }
            (ReceiveStatus::Failed, CctxStatus::PendingRevert) => {
                cctx.set_status(CctxStatus::Aborted, "revert failed", height)
            }
            (ReceiveStatus::Failed, _) => self.start_revert(ctx, cctx)?,
        }
        self.set_cctx(cctx)?;

        tracing::info!(
            cctx = %cctx.index,
            chain = %chain,
            nonce,
            old = %old_status,
            new = %cctx.status,
            "outbound finalized"
        );
        Ok(())
    }

    /// Schedule a revert back to the sender, or abort when it cannot be
    /// scheduled.
    fn start_revert(&self, ctx: &impl BlockContext, cctx: &mut CrossChainTx) -> Result<(), CrosschainError> {
        let height = ctx.height();
        let chain = cctx.inbound.sender_chain_id;
        match self.observer().schedule_outbound(ctx, chain, &cctx.index) {
            Ok((tss_pubkey, tss_nonce)) => {
                cctx.outbound.push(OutboundParams {
                    receiver: cctx.inbound.sender.clone(),
                    receiver_chain_id: chain,
                    amount: cctx.inbound.amount,
                    tss_pubkey,
                    tss_nonce,
                    ballot_index: None,
                    observed_hash: None,
                    observed_status: None,
                });
                cctx.set_status(CctxStatus::PendingRevert, "outbound failed, reverting", height);
            }
            Err(e) if e.kind() == ErrorKind::Store => return Err(e.into()),
            Err(e) => {
                tracing::warn!(cctx = %cctx.index, error = %e, "cannot schedule revert, aborting");
                cctx.set_status(CctxStatus::Aborted, format!("outbound failed, revert impossible: {e}"), height);
            }
        }
        Ok(())
    }
}
