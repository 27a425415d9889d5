//! # quarry-core
//! Transaction admission and block construction over a UTXO ledger:
//! core data types, an unspent-output ledger with atomic apply, a
//! fee-rate-ordered mempool with replace-by-fee and capacity eviction,
//! and a greedy block assembler.

pub mod assembler;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod mempool;
pub mod types;
