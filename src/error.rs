use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failure kinds of the ledger, distinguishable so callers can branch on
/// them instead of matching message strings.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },
    #[error("charging {amount} to balance {point} would exceed the maximum")]
    Overflow { point: i64, amount: i64 },
    #[error("insufficient balance: have {point}, requested {amount}")]
    InsufficientBalance { point: i64, amount: i64 },
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
