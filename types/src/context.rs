//! Current block context provided by the surrounding ledger.

use crate::BlockHeight;

/// Read access to the block currently being executed.
///
/// Every state transition runs inside exactly one block; the height is used
/// for ballot creation heights, maturity GC and keygen target heights.
pub trait BlockContext {
    fn height(&self) -> BlockHeight;
}

impl BlockContext for BlockHeight {
    fn height(&self) -> BlockHeight {
        *self
    }
}
