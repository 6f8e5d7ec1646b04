use super::point::{PointHistory, TransactionKind, UserPoint};
use crate::error::Result;
use async_trait::async_trait;

pub type BalanceStoreBox = Box<dyn BalanceStore>;
pub type HistoryLogBox = Box<dyn HistoryLog>;

/// Storage port for current balances.
///
/// Implementations perform no validation and no per-user serialization;
/// both are the coordinator's job. A single `write` must be atomic with
/// respect to concurrent `read`s of the same user.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Returns the user's record, or the implicit zero-balance record
    /// (timestamp = now) if the user has never been seen.
    async fn read(&self, user_id: u64) -> Result<UserPoint>;

    /// Unconditionally replaces the user's record; returns the stored one.
    async fn write(&self, user_id: u64, point: i64, update_millis: i64) -> Result<UserPoint>;
}

/// Storage port for the append-only transaction history.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Assigns the next global entry id and stores the entry.
    async fn append(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        update_millis: i64,
    ) -> Result<PointHistory>;

    /// All of the user's entries in insertion order (id ascending).
    async fn list_by_user(&self, user_id: u64) -> Result<Vec<PointHistory>>;
}
