//! Span constructors for node operations.
//!
//! Consistent span names and field sets make it easy to filter and
//! correlate a block's log lines with the messages it contained.

use tracing::{info_span, Span};

/// Span covering one block, from its first message to end-of-block GC.
pub fn block_span(height: i64, messages: usize) -> Span {
    info_span!("block", height = height, messages = messages)
}

/// Span covering a single message handler.
pub fn message_span(msg_type: &str, signer: &str) -> Span {
    info_span!("message", msg_type = %msg_type, signer = %signer)
}
