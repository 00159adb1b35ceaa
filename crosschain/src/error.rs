//! Cross-chain errors.

use interop_observer::{ErrorKind, ObserverError};
use interop_store::StoreError;
use interop_types::ChainId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrosschainError {
    #[error("cctx {0} not found")]
    CctxNotFound(String),

    #[error("inbound {hash} (chain {chain}, event {event_index}) is already finalized")]
    InboundAlreadyFinalized {
        chain: ChainId,
        hash: String,
        event_index: u64,
    },

    #[error("cctx {index}: nonce {got} does not match outbound nonce {expected}")]
    NonceMismatch {
        index: String,
        expected: u64,
        got: u64,
    },

    #[error("cctx {index}: chain {got} does not match outbound chain {expected}")]
    ChainMismatch {
        index: String,
        expected: ChainId,
        got: ChainId,
    },

    #[error("cctx {index} has no pending outbound (status {status})")]
    NoPendingOutbound { index: String, status: String },

    #[error("cctx {index} is already finalized (status {status})")]
    CctxAlreadyFinalized { index: String, status: String },

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Observer(#[from] ObserverError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CrosschainError {
    /// Classification shared with the observer module.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CrosschainError::CctxNotFound(_) => ErrorKind::NotFound,
            CrosschainError::InboundAlreadyFinalized { .. }
            | CrosschainError::NonceMismatch { .. }
            | CrosschainError::ChainMismatch { .. }
            | CrosschainError::NoPendingOutbound { .. }
            | CrosschainError::CctxAlreadyFinalized { .. }
            | CrosschainError::InvalidMessage(_) => ErrorKind::Protocol,
            CrosschainError::Observer(e) => e.kind(),
            CrosschainError::Store(_) => ErrorKind::Store,
        }
    }
}
