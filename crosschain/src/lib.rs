//! Cross-chain transactions (CCTX) and the votes that drive them.
//!
//! An inbound vote reports a transaction seen on a sender chain. Once its
//! ballot finalizes, a CCTX is created and an outbound nonce on the receiver
//! chain is scheduled for it. An outbound vote reports the result of that
//! outbound; once its ballot finalizes, the nonce leaves the pending window
//! and the CCTX moves on (mined, revert, abort).

pub mod cctx;
pub mod error;
pub mod inbound;
pub mod keeper;
pub mod keys;
pub mod messages;
pub mod outbound;

pub use cctx::{CctxStatus, CrossChainTx, InboundParams, OutboundParams};
pub use error::CrosschainError;
pub use keeper::CrosschainKeeper;
pub use messages::{MsgVoteInbound, MsgVoteOutbound};
