//! Core data types: transaction identifiers, outpoints, fee rates,
//! transactions, and blocks.
//!
//! Values, fees, and sizes are plain `u64` amounts and byte counts.
//! Transaction identifiers are caller-assigned (see [`TxIdGenerator`]);
//! the library never allocates ids on its own.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A transaction identifier.
///
/// Assigned by the caller at construction time, either directly or from
/// a [`TxIdGenerator`]. Uniqueness is the caller's responsibility; the
/// mempool rejects duplicate ids on admission.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct TxId(pub u64);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx{:04}", self.0)
    }
}

/// Hands out sequential transaction ids, starting at 1.
///
/// A plain owned value, held by whichever component constructs
/// transactions. Id 0 is left free for seeded genesis outputs.
#[derive(Debug, Clone)]
pub struct TxIdGenerator {
    next: u64,
}

impl TxIdGenerator {
    /// Create a generator whose first id is `tx0001`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> TxId {
        let id = TxId(self.next);
        self.next += 1;
        id
    }
}

impl Default for TxIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to a specific output of a previous transaction.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct OutPoint {
    /// Transaction that produced the referenced output.
    pub txid: TxId,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl OutPoint {
    /// Create an outpoint from a producing txid and output index.
    pub fn new(txid: TxId, index: u32) -> Self {
        Self { txid, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A transaction output, creating one new spendable entry.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// Output value.
    pub value: u64,
}

/// Exact fee-per-byte ratio of a transaction.
///
/// Compared by u128 cross-multiplication of the raw `fee`/`size` pair:
/// ordering is exact for every representable pair and total, so the type
/// can key ordered collections. Zero-size rates compare as maximal.
/// Equality follows the ratio, not the fields:
/// `FeeRate::new(1, 2) == FeeRate::new(2, 4)`.
#[derive(Clone, Copy, Debug)]
pub struct FeeRate {
    fee: u64,
    size: u64,
}

impl FeeRate {
    /// Create a fee rate from a fee and a size in bytes.
    pub fn new(fee: u64, size: u64) -> Self {
        Self { fee, size }
    }

    /// The ratio as a float, for display and reporting only.
    pub fn as_f64(&self) -> f64 {
        if self.size == 0 {
            return f64::INFINITY;
        }
        self.fee as f64 / self.size as f64
    }
}

impl Ord for FeeRate {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.size, other.size) {
            (0, 0) => Ordering::Equal,
            (0, _) => Ordering::Greater,
            (_, 0) => Ordering::Less,
            _ => {
                let lhs = u128::from(self.fee) * u128::from(other.size);
                let rhs = u128::from(other.fee) * u128::from(self.size);
                lhs.cmp(&rhs)
            }
        }
    }
}

impl PartialOrd for FeeRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FeeRate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FeeRate {}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.as_f64())
    }
}

/// A transaction spending previous outputs and declaring new ones.
///
/// Immutable once constructed: admission and assembly only read it. The
/// declared `size` stands in for a serialized length; the declared `fee`
/// is the amount by which input values must exceed output values.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Caller-assigned unique identifier.
    pub id: TxId,
    /// Outpoints consumed by this transaction.
    pub inputs: Vec<OutPoint>,
    /// New outputs created by this transaction.
    pub outputs: Vec<TxOutput>,
    /// Declared fee.
    pub fee: u64,
    /// Declared size in bytes.
    pub size: u64,
    /// Whether a conflicting higher-fee-rate transaction may replace
    /// this one while it is pending.
    pub replaceable: bool,
}

impl Transaction {
    /// Fee per byte as an exactly ordered rate.
    pub fn fee_rate(&self) -> FeeRate {
        FeeRate::new(self.fee, self.size)
    }

    /// Whether this transaction spends any outpoint `other` also spends.
    pub fn conflicts_with(&self, other: &Transaction) -> bool {
        self.inputs.iter().any(|op| other.inputs.contains(op))
    }

    /// Whether any input spends an output produced by `txid`.
    pub fn depends_on(&self, txid: TxId) -> bool {
        self.inputs.iter().any(|op| op.txid == txid)
    }

    /// Sum of declared output values, or `None` on overflow.
    pub fn total_output_value(&self) -> Option<u64> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }
}

/// A block under construction or completed: selected transactions plus
/// running size and fee totals.
///
/// Fields are private so the totals cannot drift from the transaction
/// list; mutation only happens through [`push`](Block::push).
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    transactions: Vec<Transaction>,
    total_size: u64,
    total_fees: u64,
}

impl Block {
    /// Create an empty block with zero totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction, growing the size and fee totals.
    ///
    /// Performs no validation; the assembler only pushes transactions it
    /// has already applied to its speculative ledger.
    pub fn push(&mut self, tx: Transaction) {
        self.total_size += tx.size;
        self.total_fees += tx.fee;
        self.transactions.push(tx);
    }

    /// Selected transactions in inclusion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Sum of included transaction sizes in bytes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Sum of included transaction fees.
    pub fn total_fees(&self) -> u64 {
        self.total_fees
    }

    /// Number of included transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether no transaction has been included yet.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block({} txs, {} bytes, fees={})",
            self.transactions.len(),
            self.total_size,
            self.total_fees
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Create a single-input transaction with the given fee and size.
    fn sample_tx(id: u64, fee: u64, size: u64) -> Transaction {
        Transaction {
            id: TxId(id),
            inputs: vec![OutPoint::new(TxId(0), id as u32)],
            outputs: vec![TxOutput { value: 100 }],
            fee,
            size,
            replaceable: false,
        }
    }

    // ------------------------------------------------------------------
    // TxId and TxIdGenerator
    // ------------------------------------------------------------------

    #[test]
    fn txid_display_pads_to_four_digits() {
        assert_eq!(TxId(7).to_string(), "tx0007");
        assert_eq!(TxId(12345).to_string(), "tx12345");
    }

    #[test]
    fn txid_orders_numerically() {
        assert!(TxId(2) < TxId(10));
        assert!(TxId(10) < TxId(11));
    }

    #[test]
    fn generator_hands_out_sequential_ids() {
        let mut generator = TxIdGenerator::new();
        assert_eq!(generator.next_id(), TxId(1));
        assert_eq!(generator.next_id(), TxId(2));
        assert_eq!(generator.next_id(), TxId(3));
    }

    #[test]
    fn default_generator_starts_at_one() {
        let mut generator = TxIdGenerator::default();
        assert_eq!(generator.next_id(), TxId(1));
    }

    // ------------------------------------------------------------------
    // OutPoint
    // ------------------------------------------------------------------

    #[test]
    fn outpoint_display_joins_txid_and_index() {
        let op = OutPoint::new(TxId(1), 3);
        assert_eq!(op.to_string(), "tx0001:3");
    }

    #[test]
    fn outpoint_works_as_map_key() {
        let mut map = std::collections::HashMap::new();
        map.insert(OutPoint::new(TxId(9), 1), 500u64);
        assert_eq!(map.get(&OutPoint::new(TxId(9), 1)), Some(&500));
        assert_eq!(map.get(&OutPoint::new(TxId(9), 2)), None);
    }

    // ------------------------------------------------------------------
    // FeeRate ordering
    // ------------------------------------------------------------------

    #[test]
    fn fee_rate_orders_by_ratio() {
        let low = FeeRate::new(100, 200); // 0.5
        let mid = FeeRate::new(300, 200); // 1.5
        let high = FeeRate::new(500, 200); // 2.5
        assert!(low < mid);
        assert!(mid < high);
        assert!(low < high);
    }

    #[test]
    fn fee_rate_reduced_forms_are_equal() {
        assert_eq!(FeeRate::new(1, 2), FeeRate::new(2, 4));
        assert_eq!(FeeRate::new(3, 9), FeeRate::new(1, 3));
        assert_eq!(
            FeeRate::new(1, 2).cmp(&FeeRate::new(2, 4)),
            Ordering::Equal
        );
    }

    #[test]
    fn fee_rate_comparison_is_exact_beyond_milli_precision() {
        // Differ only in the fourth decimal place.
        assert!(FeeRate::new(1001, 3000) > FeeRate::new(1000, 3000));
        assert!(FeeRate::new(1000, 3001) < FeeRate::new(1000, 3000));
    }

    #[test]
    fn fee_rate_zero_size_is_maximal() {
        assert!(FeeRate::new(1, 0) > FeeRate::new(u64::MAX, 1));
        assert_eq!(FeeRate::new(0, 0), FeeRate::new(5, 0));
    }

    #[test]
    fn fee_rate_extreme_values_do_not_overflow() {
        assert!(FeeRate::new(u64::MAX, 1) > FeeRate::new(u64::MAX, 2));
        assert_eq!(
            FeeRate::new(u64::MAX, u64::MAX),
            FeeRate::new(1, 1)
        );
    }

    #[test]
    fn fee_rate_displays_three_decimals() {
        assert_eq!(FeeRate::new(500, 200).to_string(), "2.500");
        assert_eq!(FeeRate::new(1, 3).to_string(), "0.333");
    }

    // ------------------------------------------------------------------
    // Transaction helpers
    // ------------------------------------------------------------------

    #[test]
    fn transaction_fee_rate_uses_declared_fields() {
        let tx = sample_tx(1, 300, 200);
        assert_eq!(tx.fee_rate(), FeeRate::new(3, 2));
    }

    #[test]
    fn conflicts_with_detects_shared_input() {
        let a = Transaction {
            inputs: vec![OutPoint::new(TxId(0), 0), OutPoint::new(TxId(0), 1)],
            ..sample_tx(1, 10, 100)
        };
        let b = Transaction {
            inputs: vec![OutPoint::new(TxId(0), 1)],
            ..sample_tx(2, 10, 100)
        };
        let c = Transaction {
            inputs: vec![OutPoint::new(TxId(0), 2)],
            ..sample_tx(3, 10, 100)
        };
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
        assert!(!a.conflicts_with(&c));
    }

    #[test]
    fn depends_on_matches_input_txid() {
        let tx = sample_tx(5, 10, 100);
        assert!(tx.depends_on(TxId(0)));
        assert!(!tx.depends_on(TxId(7)));
    }

    #[test]
    fn total_output_value_sums_outputs() {
        let tx = Transaction {
            outputs: vec![TxOutput { value: 300 }, TxOutput { value: 200 }],
            ..sample_tx(1, 10, 100)
        };
        assert_eq!(tx.total_output_value(), Some(500));
    }

    #[test]
    fn total_output_value_detects_overflow() {
        let tx = Transaction {
            outputs: vec![
                TxOutput { value: u64::MAX },
                TxOutput { value: 1 },
            ],
            ..sample_tx(1, 10, 100)
        };
        assert_eq!(tx.total_output_value(), None);
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    #[test]
    fn transaction_survives_json_round_trip() {
        let tx = Transaction {
            inputs: vec![OutPoint::new(TxId(0), 3)],
            outputs: vec![TxOutput { value: 250 }],
            ..sample_tx(7, 40, 180)
        };

        let encoded = serde_json::to_string(&tx).unwrap();
        let decoded: Transaction = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn block_serializes_with_totals() {
        let mut block = Block::new();
        block.push(sample_tx(1, 50, 300));

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["total_size"], 300);
        assert_eq!(value["total_fees"], 50);
        assert_eq!(value["transactions"][0]["id"], 1);
    }

    // ------------------------------------------------------------------
    // Block
    // ------------------------------------------------------------------

    #[test]
    fn new_block_is_empty() {
        let block = Block::new();
        assert!(block.is_empty());
        assert_eq!(block.len(), 0);
        assert_eq!(block.total_size(), 0);
        assert_eq!(block.total_fees(), 0);
    }

    #[test]
    fn push_accumulates_totals_in_order() {
        let mut block = Block::new();
        block.push(sample_tx(1, 50, 300));
        block.push(sample_tx(2, 70, 400));

        assert_eq!(block.len(), 2);
        assert_eq!(block.total_size(), 700);
        assert_eq!(block.total_fees(), 120);
        assert_eq!(block.transactions()[0].id, TxId(1));
        assert_eq!(block.transactions()[1].id, TxId(2));
    }

    #[test]
    fn block_display_reports_totals() {
        let mut block = Block::new();
        block.push(sample_tx(1, 50, 300));
        assert_eq!(block.to_string(), "Block(1 txs, 300 bytes, fees=50)");
    }
}
