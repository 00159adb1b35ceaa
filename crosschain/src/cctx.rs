//! Cross-chain transaction record and its status lifecycle.

use interop_observer::ReceiveStatus;
use interop_types::{BlockHeight, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a cross-chain transaction.
///
/// ```text
/// PendingInbound ──► PendingOutbound ──► OutboundMined
///        │                 │
///        ▼                 ▼ (outbound failed)
///     Aborted        PendingRevert ──► Reverted
///                          │
///                          ▼ (revert failed)
///                       Aborted
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CctxStatus {
    PendingInbound,
    PendingOutbound,
    OutboundMined,
    PendingRevert,
    Reverted,
    Aborted,
}

impl CctxStatus {
    /// Whether an outbound is in flight and awaits an outbound vote.
    pub fn awaits_outbound(&self) -> bool {
        matches!(self, Self::PendingOutbound | Self::PendingRevert)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OutboundMined | Self::Reverted | Self::Aborted)
    }
}

impl fmt::Display for CctxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundParams {
    pub sender: String,
    pub sender_chain_id: ChainId,
    pub amount: u128,
    pub observed_hash: String,
    pub observed_height: u64,
    pub event_index: u64,
    pub ballot_index: String,
    pub finalized_height: BlockHeight,
}

/// One outbound attempt. A revert appends a second attempt back to the
/// sender chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundParams {
    pub receiver: String,
    pub receiver_chain_id: ChainId,
    pub amount: u128,
    pub tss_pubkey: String,
    pub tss_nonce: u64,
    /// Set once the outbound ballot finalizes.
    #[serde(default)]
    pub ballot_index: Option<String>,
    #[serde(default)]
    pub observed_hash: Option<String>,
    #[serde(default)]
    pub observed_status: Option<ReceiveStatus>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainTx {
    /// Inbound ballot digest.
    pub index: String,
    pub status: CctxStatus,
    pub status_message: String,
    pub last_update_height: BlockHeight,
    pub inbound: InboundParams,
    pub outbound: Vec<OutboundParams>,
}

impl CrossChainTx {
    /// The attempt the next outbound vote refers to.
    pub fn current_outbound(&self) -> Option<&OutboundParams> {
        self.outbound.last()
    }

    pub fn current_outbound_mut(&mut self) -> Option<&mut OutboundParams> {
        self.outbound.last_mut()
    }

    pub fn set_status(&mut self, status: CctxStatus, message: impl Into<String>, height: BlockHeight) {
        self.status = status;
        self.status_message = message.into();
        self.last_update_height = height;
    }
}
