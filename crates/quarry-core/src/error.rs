//! Error types for ledger validation, apply, and mempool admission.
use thiserror::Error;

use crate::types::{OutPoint, TxId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing unspent output {0}")] MissingOutput(OutPoint),
    #[error("insufficient funds: have {have}, need {need}")] InsufficientFunds { have: u64, need: u64 },
    #[error("value overflow")] ValueOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unspent output not found: {0}")] NotFound(OutPoint),
    #[error("invalid tx {txid}: {source}")] InvalidApply { txid: TxId, source: ValidationError },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction {0} already in pool")] Duplicate(TxId),
    #[error("conflicts with non-replaceable tx {0}")] NonReplaceable(TxId),
    #[error("fee rate not higher than conflicting tx {0}")] FeeTooLow(TxId),
    #[error(transparent)] InvalidTransaction(#[from] ValidationError),
}
