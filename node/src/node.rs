//! The observer node: applies blocks of messages to the module state.
//!
//! Each message runs against its own [`WriteBatch`]. The batch is committed
//! only when the handler returns `Ok`, so a rejected message leaves no trace
//! in the store. End-of-block processing (the self-delegation sweep, maturity
//! GC and the last applied height) commits as one more batch.

use std::time::Instant;

use interop_crosschain::CrosschainKeeper;
use interop_observer::{ChainParams, ChainParamsList, ObserverKeeper};
use interop_store::{KvStore, MetaStore, WriteBatch};
use interop_types::{AccountAddress, BlockContext, BlockHeight, ObserverParams, ValidatorRegistry};

use crate::message::{BlockInput, Msg, MsgResponse};
use crate::metrics::NodeMetrics;
use crate::tracing_spans::{block_span, message_span};
use crate::NodeError;

/// Counts reported after a block has been applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockSummary {
    pub applied: usize,
    pub rejected: usize,
    pub pruned: usize,
    /// The block was at or below the last applied height and was skipped.
    pub skipped: bool,
}

pub struct ObserverNode<S, V> {
    store: S,
    validators: V,
    params: ObserverParams,
    admins: Vec<AccountAddress>,
    metrics: NodeMetrics,
}

impl<S: KvStore, V: ValidatorRegistry> ObserverNode<S, V> {
    pub fn new(
        store: S,
        validators: V,
        params: ObserverParams,
        admins: Vec<AccountAddress>,
    ) -> Result<Self, NodeError> {
        Ok(Self {
            store,
            validators,
            params,
            admins,
            metrics: NodeMetrics::new()?,
        })
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    /// A keeper reading committed state.
    pub fn keeper(&self) -> CrosschainKeeper<&S, &V> {
        self.keeper_over(&self.store)
    }

    fn keeper_over<'a, T: KvStore>(&'a self, store: T) -> CrosschainKeeper<T, &'a V> {
        CrosschainKeeper::new(
            ObserverKeeper::new(store, &self.validators, self.params.clone())
                .with_admins(self.admins.clone()),
        )
    }

    /// Height of the last block whose end-of-block processing committed.
    pub fn last_block_height(&self) -> Result<Option<BlockHeight>, NodeError> {
        Ok(self.store.get_last_block_height()?.map(BlockHeight::new))
    }

    /// Install the configured chain params on a store that has none.
    /// Returns whether anything was written.
    pub fn bootstrap_chain_params(&self, chain_params: &[ChainParams]) -> Result<bool, NodeError> {
        if chain_params.is_empty() || self.keeper().observer().get_chain_params_list()?.is_some() {
            return Ok(false);
        }
        let list = ChainParamsList {
            chain_params: chain_params.to_vec(),
        };
        list.validate()?;

        let batch = WriteBatch::new(&self.store);
        self.keeper_over(&batch).observer().set_chain_params_list(&list)?;
        batch.commit()?;
        tracing::info!(chains = list.chain_params.len(), "installed chain params");
        Ok(true)
    }

    /// Apply one message atomically.
    pub fn deliver(&self, ctx: &impl BlockContext, msg: &Msg) -> Result<MsgResponse, NodeError> {
        let _span = message_span(msg.name(), msg.signer().as_str()).entered();

        let batch = WriteBatch::new(&self.store);
        let response = {
            let keeper = self.keeper_over(&batch);
            dispatch(&keeper, ctx, msg)?
        };
        let writes = batch.len();
        batch.commit()?;

        self.metrics
            .messages_applied
            .with_label_values(&[msg.name()])
            .inc();
        if response.ballot_created() {
            self.metrics.ballots_created.inc();
        }
        if response.vote_finalized() {
            self.metrics.ballots_finalized.inc();
        }
        tracing::debug!(writes, "message applied");
        Ok(response)
    }

    /// End-of-block processing: drop observers whose self-delegation fell
    /// below the minimum, run maturity GC, then record the height.
    pub fn end_block(&self, ctx: &impl BlockContext) -> Result<usize, NodeError> {
        let batch = WriteBatch::new(&self.store);
        let pruned = {
            let keeper = self.keeper_over(&batch);
            let removed = keeper.observer().enforce_observer_self_delegation(ctx)?;
            if removed > 0 {
                tracing::info!(removed, "observers below minimum self-delegation removed");
            }
            keeper.observer().end_block(ctx)?
        };
        batch.set_last_block_height(ctx.height().as_i64())?;
        batch.commit()?;

        self.metrics.ballots_pruned.inc_by(pruned as u64);
        self.metrics.block_height.set(ctx.height().as_i64());
        Ok(pruned)
    }

    /// Apply every message of a block, then run end-of-block processing.
    ///
    /// Rejected messages are logged and counted; failures of the store abort
    /// the block with an error. Blocks at or below the last applied height
    /// are skipped, so a message log can be replayed onto an existing store.
    pub fn apply_block(&self, block: &BlockInput) -> Result<BlockSummary, NodeError> {
        let _span = block_span(block.height.as_i64(), block.messages.len()).entered();

        if let Some(last) = self.last_block_height()? {
            if block.height <= last {
                tracing::debug!(last = last.as_i64(), "block already applied, skipping");
                return Ok(BlockSummary {
                    skipped: true,
                    ..BlockSummary::default()
                });
            }
        }

        let started = Instant::now();
        let ctx = block.height;
        let mut summary = BlockSummary::default();

        for msg in &block.messages {
            match self.deliver(&ctx, msg) {
                Ok(_) => summary.applied += 1,
                Err(e) if e.is_fatal() => {
                    tracing::error!(msg_type = msg.name(), error = %e, "failed to apply message");
                    return Err(e);
                }
                Err(e) => {
                    let kind = e
                        .message_kind()
                        .map(|k| format!("{k:?}").to_lowercase())
                        .unwrap_or_else(|| "other".to_string());
                    tracing::warn!(
                        msg_type = msg.name(),
                        signer = %msg.signer(),
                        kind = %kind,
                        error = %e,
                        "message rejected"
                    );
                    self.metrics.messages_rejected.with_label_values(&[kind.as_str()]).inc();
                    summary.rejected += 1;
                }
            }
        }

        summary.pruned = self.end_block(&ctx)?;
        self.metrics
            .block_apply_time_ms
            .observe(started.elapsed().as_secs_f64() * 1_000.0);
        tracing::info!(
            applied = summary.applied,
            rejected = summary.rejected,
            pruned = summary.pruned,
            "block applied"
        );
        Ok(summary)
    }
}

fn dispatch<S: KvStore, V: ValidatorRegistry>(
    keeper: &CrosschainKeeper<S, V>,
    ctx: &impl BlockContext,
    msg: &Msg,
) -> Result<MsgResponse, NodeError> {
    let observer = keeper.observer();
    let response = match msg {
        Msg::VoteInbound(m) => MsgResponse::Vote(keeper.vote_inbound(ctx, m)?),
        Msg::VoteOutbound(m) => MsgResponse::Vote(keeper.vote_outbound(ctx, m)?),
        Msg::VoteTss(m) => MsgResponse::VoteTss(observer.vote_tss(ctx, m)?),
        Msg::AddBlameVote(m) => MsgResponse::Vote(observer.add_blame_vote(ctx, m)?),
        Msg::VoteBlockHeader(m) => MsgResponse::Vote(observer.vote_block_header(ctx, m)?),
        Msg::UpdateObserver(m) => {
            observer.update_observer(ctx, m)?;
            MsgResponse::Done
        }
        Msg::AddObserver(m) => MsgResponse::ObserverCount(observer.add_observer(ctx, m)?),
        Msg::RemoveObserver(m) => MsgResponse::ObserverCount(observer.remove_observer(ctx, m)?),
        Msg::ResetChainNonces(m) => {
            observer.reset_chain_nonces(ctx, m)?;
            MsgResponse::Done
        }
        Msg::UpdateTss(m) => {
            observer.handle_update_tss(ctx, m)?;
            MsgResponse::Done
        }
        Msg::UpdateKeygen(m) => {
            observer.handle_update_keygen(ctx, m)?;
            MsgResponse::Done
        }
        Msg::UpdateChainParams(m) => {
            observer.update_chain_params(m)?;
            MsgResponse::Done
        }
    };
    Ok(response)
}
