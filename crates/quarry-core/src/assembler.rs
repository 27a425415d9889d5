//! Greedy block assembly against a speculative ledger view.
//!
//! Selection walks the mempool's fee-rate-descending candidates and
//! packs a size-limited block: candidates too large for the remaining
//! budget are skipped (not terminal), candidates that no longer apply
//! against the speculative ledger are skipped, everything else is
//! applied and included. The real pool and ledger are never touched.

use crate::ledger::UtxoLedger;
use crate::mempool::Mempool;
use crate::types::Block;

/// Assemble a block of at most `max_block_size` bytes.
///
/// Greedy single pass in strict fee-rate priority order with no
/// backtracking: a skipped candidate is never retried, and skipping an
/// oversized candidate keeps the scan going so smaller ones further down
/// still fit. Each included transaction is applied to a private ledger
/// clone, so later candidates see the outputs of earlier ones; a
/// candidate whose inputs are not present in that speculative state
/// fails to apply and is skipped. The passed-in pool and ledger are
/// read-only to this call.
pub fn assemble_block(mempool: &Mempool, ledger: &UtxoLedger, max_block_size: u64) -> Block {
    let mut block = Block::new();
    let mut speculative = ledger.clone();

    for tx in mempool.sorted_candidates() {
        if block.total_size() + tx.size > max_block_size {
            continue;
        }
        // Apply re-validates against the speculative state and leaves
        // it untouched on failure.
        if speculative.apply(&tx).is_err() {
            continue;
        }
        block.push(tx);
    }

    block
}
