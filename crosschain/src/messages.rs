//! Inbound and outbound observation votes.

use interop_observer::ReceiveStatus;
use interop_types::{AccountAddress, ChainId, Digest, DigestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVoteInbound {
    pub signer: AccountAddress,
    pub sender: String,
    pub sender_chain_id: ChainId,
    pub receiver: String,
    pub receiver_chain_id: ChainId,
    pub amount: u128,
    pub inbound_hash: String,
    /// Height of the inbound on the sender chain. Observers may see the
    /// transaction at different heights, so it is not part of the digest.
    pub inbound_block_height: u64,
    #[serde(default)]
    pub event_index: u64,
}

impl MsgVoteInbound {
    /// Ballot digest, also used as the CCTX index.
    pub fn digest(&self) -> Digest {
        DigestBuilder::new("inbound")
            .str(&self.sender)
            .i64(self.sender_chain_id.as_i64())
            .str(&self.receiver)
            .i64(self.receiver_chain_id.as_i64())
            .u128(self.amount)
            .str(&self.inbound_hash)
            .u64(self.event_index)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVoteOutbound {
    pub signer: AccountAddress,
    pub cctx_index: String,
    pub outbound_hash: String,
    pub outbound_chain_id: ChainId,
    pub tss_nonce: u64,
    pub status: ReceiveStatus,
    #[serde(default)]
    pub value_received: u128,
}

impl MsgVoteOutbound {
    /// Ballot digest. The observed status is part of it, so observers
    /// reporting a failure vote on a different ballot than those reporting
    /// success.
    pub fn digest(&self) -> Digest {
        let status: u64 = match self.status {
            ReceiveStatus::Success => 0,
            ReceiveStatus::Failed => 1,
        };
        DigestBuilder::new("outbound")
            .str(&self.cctx_index)
            .str(&self.outbound_hash)
            .i64(self.outbound_chain_id.as_i64())
            .u64(self.tss_nonce)
            .u64(status)
            .u128(self.value_received)
            .finish()
    }
}
