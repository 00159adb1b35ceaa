//! Messages handled by the observer module and their responses.

use crate::ballot::VoteType;
use crate::blame::{blame_index, Blame, NodeBlame};
use crate::chain_params::ChainParams;
use interop_types::{AccountAddress, BlockHeight, ChainId, Digest, DigestBuilder};
use serde::{Deserialize, Serialize};

/// Outcome of an observation as reported by an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiveStatus {
    Success,
    Failed,
}

impl From<ReceiveStatus> for VoteType {
    fn from(status: ReceiveStatus) -> Self {
        match status {
            ReceiveStatus::Success => VoteType::Success,
            ReceiveStatus::Failed => VoteType::Failure,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObserverUpdateReason {
    /// The old observer's validator was tombstoned; the observer itself
    /// moves to a new address.
    Tombstoned,
    /// An admin replaces the observer.
    AdminUpdate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVoteTss {
    pub signer: AccountAddress,
    pub tss_pubkey: String,
    pub keygen_height: BlockHeight,
    pub status: ReceiveStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddBlameVote {
    pub signer: AccountAddress,
    pub chain_id: ChainId,
    pub nonce: u64,
    pub digest: String,
    pub failure_reason: String,
    #[serde(default)]
    pub nodes: Vec<NodeBlame>,
}

impl MsgAddBlameVote {
    /// Ballot digest. Independent of the signer so that every observer
    /// reporting the same blame votes on the same ballot.
    pub fn ballot_digest(&self) -> Digest {
        let mut builder = DigestBuilder::new("blame")
            .i64(self.chain_id.as_i64())
            .u64(self.nonce)
            .str(&self.digest)
            .str(&self.failure_reason)
            .u64(self.nodes.len() as u64);
        for node in &self.nodes {
            builder = builder.str(&node.pubkey).bytes(&node.blame_data);
        }
        builder.finish()
    }

    pub fn to_blame(&self) -> Blame {
        Blame {
            index: blame_index(self.chain_id, self.nonce, &self.digest),
            chain_id: self.chain_id,
            nonce: self.nonce,
            digest: self.digest.clone(),
            failure_reason: self.failure_reason.clone(),
            nodes: self.nodes.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVoteBlockHeader {
    pub signer: AccountAddress,
    pub chain_id: ChainId,
    pub block_hash: String,
    pub height: i64,
    pub header: Vec<u8>,
}

impl MsgVoteBlockHeader {
    pub fn ballot_digest(&self) -> Digest {
        DigestBuilder::new("block_header")
            .i64(self.chain_id.as_i64())
            .str(&self.block_hash)
            .i64(self.height)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateObserver {
    pub signer: AccountAddress,
    pub old_observer_address: AccountAddress,
    pub new_observer_address: AccountAddress,
    pub update_reason: ObserverUpdateReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddObserver {
    pub signer: AccountAddress,
    pub observer_address: AccountAddress,
    pub granted_pubkey: String,
    /// Register the node account without adding it to the observer set.
    #[serde(default)]
    pub add_node_account_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRemoveObserver {
    pub signer: AccountAddress,
    pub observer_address: AccountAddress,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgResetChainNonces {
    pub signer: AccountAddress,
    pub chain_id: ChainId,
    pub nonce_low: u64,
    pub nonce_high: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateTss {
    pub signer: AccountAddress,
    pub tss_pubkey: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateKeygen {
    pub signer: AccountAddress,
    pub block: BlockHeight,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateChainParams {
    pub signer: AccountAddress,
    pub chain_params: ChainParams,
}

/// Response of every observation vote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub ballot_created: bool,
    pub vote_finalized: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTssResponse {
    pub ballot_created: bool,
    pub vote_finalized: bool,
    pub keygen_success: bool,
}
