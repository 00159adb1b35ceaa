//! Nullable block context: deterministic block heights for testing.

use interop_types::{BlockContext, BlockHeight};
use std::cell::Cell;

/// A block context whose height only moves when you tell it to.
pub struct NullBlockContext {
    height: Cell<i64>,
}

impl NullBlockContext {
    pub fn new(height: i64) -> Self {
        Self {
            height: Cell::new(height),
        }
    }

    /// Advance by a number of blocks.
    pub fn advance(&self, blocks: i64) {
        self.height.set(self.height.get() + blocks);
    }

    /// Jump to a specific height.
    pub fn set(&self, height: i64) {
        self.height.set(height);
    }
}

impl BlockContext for NullBlockContext {
    fn height(&self) -> BlockHeight {
        BlockHeight::new(self.height.get())
    }
}

impl Default for NullBlockContext {
    fn default() -> Self {
        Self::new(1)
    }
}
