use crate::error::LedgerError;
use serde::{Deserialize, Serialize};

/// Largest balance a record can hold.
pub const MAX_POINT: i64 = i64::MAX;

/// A positive point amount for charge/use operations.
///
/// Constructing one is the only way to get an amount past the ledger
/// boundary, so zero and negative amounts are rejected exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, LedgerError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount { amount: value })
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// The direction of a balance mutation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Charge,
    Use,
}

/// The current balance of one user.
///
/// `update_millis` is strictly increasing across the record's mutations;
/// the coordinator bumps it past the previous value even when the clock
/// has not advanced.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct UserPoint {
    /// The unique identifier for the user.
    pub user_id: u64,
    /// Current balance, never negative.
    pub point: i64,
    /// Timestamp of the last mutation, in wall-clock milliseconds.
    pub update_millis: i64,
}

impl UserPoint {
    /// The implicit record for a user the ledger has never seen.
    pub fn empty(user_id: u64, now_millis: i64) -> Self {
        Self {
            user_id,
            point: 0,
            update_millis: now_millis,
        }
    }
}

/// One applied charge or use, immutable once written.
///
/// `update_millis` equals the balance record's timestamp at the moment of
/// this mutation, so for one user the order by `id` and by timestamp
/// agree.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct PointHistory {
    /// Globally unique, monotonically assigned entry id.
    pub id: u64,
    pub user_id: u64,
    /// The mutation's amount, always positive.
    pub amount: i64,
    pub kind: TransactionKind,
    pub update_millis: i64,
}
