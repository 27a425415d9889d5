//! Unspent-output ledger: authoritative spend validation and state.
//!
//! The ledger maps outpoints to unspent values. It validates candidate
//! transactions (every input present, inputs cover outputs plus fee) and
//! applies them atomically: consumed entries are removed and one entry
//! per output is created under the transaction's own id.

use std::collections::HashMap;

use crate::error::{LedgerError, ValidationError};
use crate::types::{OutPoint, Transaction};

/// In-memory set of unspent outputs.
///
/// Every key present means that output has not been consumed by any
/// applied transaction. `Clone` produces a fully independent deep copy
/// with no shared state; speculative application during block assembly
/// relies on this.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtxoLedger {
    /// Outpoint → unspent value.
    utxos: HashMap<OutPoint, u64>,
}

impl UtxoLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an unspent output.
    pub fn add(&mut self, outpoint: OutPoint, value: u64) {
        self.utxos.insert(outpoint, value);
    }

    /// Remove an unspent output, returning its value.
    ///
    /// Failing with `NotFound` means the caller bypassed validation;
    /// treat it as a programming error, not a business rejection.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Result<u64, LedgerError> {
        self.utxos
            .remove(outpoint)
            .ok_or(LedgerError::NotFound(*outpoint))
    }

    /// Whether the given outpoint is currently unspent.
    pub fn has(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    /// Value of the given unspent output, if present.
    pub fn get(&self, outpoint: &OutPoint) -> Option<u64> {
        self.utxos.get(outpoint).copied()
    }

    /// Number of unspent outputs.
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Whether the ledger holds no outputs.
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// Iterate over all unspent outputs (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &u64)> {
        self.utxos.iter()
    }

    /// Check that a transaction is spendable against the current state.
    ///
    /// Every input must reference a present outpoint (`MissingOutput`
    /// otherwise), and the referenced values must cover the declared
    /// outputs plus the fee (`InsufficientFunds` otherwise). Sums use
    /// checked arithmetic. Pure: the ledger is never mutated.
    pub fn validate(&self, tx: &Transaction) -> Result<(), ValidationError> {
        let mut input_sum: u64 = 0;
        for input in &tx.inputs {
            let value = self
                .utxos
                .get(input)
                .copied()
                .ok_or(ValidationError::MissingOutput(*input))?;
            input_sum = input_sum
                .checked_add(value)
                .ok_or(ValidationError::ValueOverflow)?;
        }

        let output_sum = tx
            .total_output_value()
            .ok_or(ValidationError::ValueOverflow)?;
        let required = output_sum
            .checked_add(tx.fee)
            .ok_or(ValidationError::ValueOverflow)?;

        if input_sum < required {
            return Err(ValidationError::InsufficientFunds {
                have: input_sum,
                need: required,
            });
        }

        Ok(())
    }

    /// Apply a transaction: consume its inputs, create its outputs.
    ///
    /// Re-validates first and returns `InvalidApply` without touching any
    /// state if validation fails. On success every input outpoint is
    /// removed and one entry per output is inserted, keyed by the
    /// transaction's id and the output's position. Fully atomic: all
    /// mutations happen or none do.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        self.validate(tx).map_err(|source| LedgerError::InvalidApply {
            txid: tx.id,
            source,
        })?;

        // Direct removal: validation confirmed presence, and an input
        // listed twice is consumed once.
        for input in &tx.inputs {
            self.utxos.remove(input);
        }
        for (index, output) in tx.outputs.iter().enumerate() {
            self.utxos
                .insert(OutPoint::new(tx.id, index as u32), output.value);
        }

        Ok(())
    }
}
