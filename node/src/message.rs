//! Message envelope applied by the node.
//!
//! Every state transition the node performs is one [`Msg`] inside a
//! [`BlockInput`]. Message logs are newline-delimited JSON, one block per
//! line:
//!
//! ```text
//! {"height":12,"messages":[{"vote_inbound":{"signer":"acc1…", …}}]}
//! ```

use interop_crosschain::{MsgVoteInbound, MsgVoteOutbound};
use interop_observer::{
    MsgAddBlameVote, MsgAddObserver, MsgRemoveObserver, MsgResetChainNonces, MsgUpdateChainParams,
    MsgUpdateKeygen, MsgUpdateObserver, MsgUpdateTss, MsgVoteBlockHeader, MsgVoteTss,
    VoteResponse, VoteTssResponse,
};
use interop_types::{AccountAddress, BlockHeight};
use serde::{Deserialize, Serialize};

use crate::NodeError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    // Observation votes
    VoteInbound(MsgVoteInbound),
    VoteOutbound(MsgVoteOutbound),
    VoteTss(MsgVoteTss),
    AddBlameVote(MsgAddBlameVote),
    VoteBlockHeader(MsgVoteBlockHeader),
    // Observer registry
    UpdateObserver(MsgUpdateObserver),
    AddObserver(MsgAddObserver),
    RemoveObserver(MsgRemoveObserver),
    // Admin
    ResetChainNonces(MsgResetChainNonces),
    UpdateTss(MsgUpdateTss),
    UpdateKeygen(MsgUpdateKeygen),
    UpdateChainParams(MsgUpdateChainParams),
}

impl Msg {
    /// Stable message type name, used in logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Msg::VoteInbound(_) => "vote_inbound",
            Msg::VoteOutbound(_) => "vote_outbound",
            Msg::VoteTss(_) => "vote_tss",
            Msg::AddBlameVote(_) => "add_blame_vote",
            Msg::VoteBlockHeader(_) => "vote_block_header",
            Msg::UpdateObserver(_) => "update_observer",
            Msg::AddObserver(_) => "add_observer",
            Msg::RemoveObserver(_) => "remove_observer",
            Msg::ResetChainNonces(_) => "reset_chain_nonces",
            Msg::UpdateTss(_) => "update_tss",
            Msg::UpdateKeygen(_) => "update_keygen",
            Msg::UpdateChainParams(_) => "update_chain_params",
        }
    }

    pub fn signer(&self) -> &AccountAddress {
        match self {
            Msg::VoteInbound(m) => &m.signer,
            Msg::VoteOutbound(m) => &m.signer,
            Msg::VoteTss(m) => &m.signer,
            Msg::AddBlameVote(m) => &m.signer,
            Msg::VoteBlockHeader(m) => &m.signer,
            Msg::UpdateObserver(m) => &m.signer,
            Msg::AddObserver(m) => &m.signer,
            Msg::RemoveObserver(m) => &m.signer,
            Msg::ResetChainNonces(m) => &m.signer,
            Msg::UpdateTss(m) => &m.signer,
            Msg::UpdateKeygen(m) => &m.signer,
            Msg::UpdateChainParams(m) => &m.signer,
        }
    }
}

/// Result of a successfully applied message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgResponse {
    Vote(VoteResponse),
    VoteTss(VoteTssResponse),
    /// Observer count after an add or remove.
    ObserverCount(u64),
    Done,
}

impl MsgResponse {
    pub fn ballot_created(&self) -> bool {
        match self {
            MsgResponse::Vote(r) => r.ballot_created,
            MsgResponse::VoteTss(r) => r.ballot_created,
            _ => false,
        }
    }

    pub fn vote_finalized(&self) -> bool {
        match self {
            MsgResponse::Vote(r) => r.vote_finalized,
            MsgResponse::VoteTss(r) => r.vote_finalized,
            _ => false,
        }
    }
}

/// The messages of one ledger block, in execution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInput {
    pub height: BlockHeight,
    #[serde(default)]
    pub messages: Vec<Msg>,
}

impl BlockInput {
    /// Parse one line of a message log.
    pub fn from_json_line(line: &str) -> Result<Self, NodeError> {
        serde_json::from_str(line).map_err(|e| NodeError::Decode(e.to_string()))
    }
}
