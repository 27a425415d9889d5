//! In-memory pool of pending transactions (mempool).
//!
//! The mempool admits candidate transactions after checking them against
//! the ledger and against already-pooled spends. It provides:
//! - O(1) lookup by txid
//! - O(1) conflict detection via a spent-outpoint index
//! - O(log n) fee-rate-ordered candidate listing
//! - replace-by-fee: a pooled conflict marked replaceable gives way to a
//!   strictly higher fee rate
//! - capacity-bounded storage with lowest-fee-rate eviction

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::constants::DEFAULT_POOL_CAPACITY;
use crate::error::MempoolError;
use crate::ledger::UtxoLedger;
use crate::types::{FeeRate, OutPoint, Transaction, TxId};

/// Pending-transaction pool with replace-by-fee and capacity eviction.
///
/// Admission runs duplicate, conflict, and ledger checks in order, then
/// replaces any conflicting entries and evicts from the bottom of the
/// fee-rate order until the pool fits its capacity again. The running
/// size total always equals the sum of pooled transaction sizes.
///
/// Not thread-safe; callers should wrap in a `Mutex` or `RwLock` if
/// concurrent access is needed.
#[derive(Debug)]
pub struct Mempool {
    /// Primary storage: txid → transaction.
    entries: HashMap<TxId, Transaction>,
    /// Spent outpoint → txid of the pool transaction that spends it.
    by_outpoint: HashMap<OutPoint, TxId>,
    /// Fee-rate-ordered index: `(fee_rate, txid)`, ascending. Lowest
    /// entry first for eviction; iterate in reverse for candidates.
    by_fee_rate: BTreeSet<(FeeRate, TxId)>,
    /// Sum of pooled transaction sizes in bytes.
    total_size: u64,
    /// Maximum total size in bytes.
    capacity: u64,
}

impl Mempool {
    /// Create a pool with the given byte capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: HashMap::new(),
            by_outpoint: HashMap::new(),
            by_fee_rate: BTreeSet::new(),
            total_size: 0,
            capacity,
        }
    }

    /// Admit a candidate transaction.
    ///
    /// Pipeline, in order:
    /// 1. reject a duplicate id;
    /// 2. for every pooled conflict: require it replaceable, and require
    ///    the candidate's fee rate strictly above the conflict's;
    /// 3. validate the candidate against the ledger;
    /// 4. drop the conflicts and insert the candidate;
    /// 5. evict lowest-fee-rate entries while the pool exceeds capacity.
    ///
    /// Any rejection leaves the pool unchanged. The eviction pass may
    /// remove the transaction that was just admitted if its fee rate is
    /// the lowest; that still reports `Ok`.
    pub fn add(&mut self, tx: Transaction, ledger: &UtxoLedger) -> Result<(), MempoolError> {
        if self.entries.contains_key(&tx.id) {
            return Err(MempoolError::Duplicate(tx.id));
        }

        let fee_rate = tx.fee_rate();
        let conflicts = self.conflicting_txids(&tx);
        for txid in &conflicts {
            if let Some(existing) = self.entries.get(txid) {
                if !existing.replaceable {
                    return Err(MempoolError::NonReplaceable(*txid));
                }
                if fee_rate <= existing.fee_rate() {
                    return Err(MempoolError::FeeTooLow(*txid));
                }
            }
        }

        ledger.validate(&tx)?;

        for txid in conflicts {
            self.take(txid);
        }

        // Insert into all indices.
        for input in &tx.inputs {
            self.by_outpoint.insert(*input, tx.id);
        }
        self.by_fee_rate.insert((fee_rate, tx.id));
        self.total_size += tx.size;
        self.entries.insert(tx.id, tx);

        self.evict_overflow();

        Ok(())
    }

    /// Remove a transaction by id.
    ///
    /// Returns whether anything was removed. Indices and the running
    /// size total stay consistent.
    pub fn remove(&mut self, txid: TxId) -> bool {
        self.take(txid).is_some()
    }

    /// Internal: remove an entry and clean up all indices.
    fn take(&mut self, txid: TxId) -> Option<Transaction> {
        let tx = self.entries.remove(&txid)?;
        for input in &tx.inputs {
            self.by_outpoint.remove(input);
        }
        self.by_fee_rate.remove(&(tx.fee_rate(), txid));
        self.total_size -= tx.size;
        Some(tx)
    }

    /// Internal: evict lowest-fee-rate entries until the pool fits its
    /// capacity. Ties at the minimum rate evict the lowest txid first,
    /// per the index order.
    fn evict_overflow(&mut self) {
        while self.total_size > self.capacity && !self.entries.is_empty() {
            if let Some(&(_, txid)) = self.by_fee_rate.iter().next() {
                self.take(txid);
            } else {
                break;
            }
        }
    }

    /// Txids of pool entries that spend any of `tx`'s inputs.
    ///
    /// Deduplicated, in ascending id order.
    pub fn conflicting_txids(&self, tx: &Transaction) -> Vec<TxId> {
        let mut conflicts = BTreeSet::new();
        for input in &tx.inputs {
            if let Some(txid) = self.by_outpoint.get(input) {
                conflicts.insert(*txid);
            }
        }
        conflicts.into_iter().collect()
    }

    /// All pooled transactions in fee-rate-descending order.
    ///
    /// Equal fee rates order by descending txid; the order is fully
    /// deterministic for a given pool state.
    pub fn sorted_candidates(&self) -> Vec<Transaction> {
        self.by_fee_rate
            .iter()
            .rev()
            .filter_map(|(_, txid)| self.entries.get(txid).cloned())
            .collect()
    }

    /// Check if a transaction with the given id is pooled.
    pub fn contains(&self, txid: TxId) -> bool {
        self.entries.contains_key(&txid)
    }

    /// Get a pooled transaction by id.
    pub fn get(&self, txid: TxId) -> Option<&Transaction> {
        self.entries.get(&txid)
    }

    /// Number of pooled transactions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of pooled transaction sizes in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Maximum total size in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Total fees of all pooled transactions.
    pub fn total_fees(&self) -> u64 {
        self.entries.values().map(|tx| tx.fee).sum()
    }
}

impl Default for Mempool {
    /// A pool with [`DEFAULT_POOL_CAPACITY`].
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl fmt::Display for Mempool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mempool({} txs, {}/{} bytes)",
            self.entries.len(),
            self.total_size,
            self.capacity
        )
    }
}
