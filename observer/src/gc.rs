//! Ballot maturity GC.
//!
//! Every block, the ballots created `ballot_maturity_blocks` or more blocks
//! ago are deleted together with their height index, whatever their status.
//! Block heights may skip, so every index at or below the matured height is
//! swept, not only the one at exactly that height.

use crate::error::ObserverError;
use crate::ObserverKeeper;
use interop_store::KvStore;
use interop_types::{BlockContext, BlockHeight, ValidatorRegistry};

impl<S: KvStore, V: ValidatorRegistry> ObserverKeeper<S, V> {
    /// Delete the ballots created at or before `current - maturity_blocks`.
    /// Returns how many ballot ids were pruned.
    pub fn run_maturity_gc(&self, current: BlockHeight, maturity_blocks: i64) -> Result<usize, ObserverError> {
        let matured = current.saturating_sub(maturity_blocks);
        let mut pruned = 0;
        // Lists come back ordered by height.
        for list in self.all_ballot_lists()? {
            if list.height > matured {
                break;
            }
            for identifier in &list.identifiers {
                self.delete_ballot(identifier)?;
            }
            self.delete_ballot_list(list.height)?;
            if !list.identifiers.is_empty() {
                tracing::info!(height = %list.height, pruned = list.identifiers.len(), "matured ballots pruned");
            }
            pruned += list.identifiers.len();
        }
        Ok(pruned)
    }

    /// Run maturity GC for the current block with the configured window.
    pub fn end_block(&self, ctx: &impl BlockContext) -> Result<usize, ObserverError> {
        self.run_maturity_gc(ctx.height(), self.params().ballot_maturity_blocks)
    }
}
