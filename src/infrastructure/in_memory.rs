use crate::domain::point::{PointHistory, TransactionKind, UserPoint};
use crate::domain::ports::{BalanceStore, HistoryLog};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory balance table.
///
/// Uses `Arc<RwLock<HashMap<u64, UserPoint>>>` for shared concurrent
/// access. Records are volatile and live for the store's lifetime.
#[derive(Default, Clone)]
pub struct InMemoryBalanceStore {
    records: Arc<RwLock<HashMap<u64, UserPoint>>>,
}

impl InMemoryBalanceStore {
    /// Creates a new, empty balance store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn read(&self, user_id: u64) -> Result<UserPoint> {
        let records = self.records.read().await;
        Ok(records
            .get(&user_id)
            .copied()
            .unwrap_or_else(|| UserPoint::empty(user_id, Utc::now().timestamp_millis())))
    }

    async fn write(&self, user_id: u64, point: i64, update_millis: i64) -> Result<UserPoint> {
        let record = UserPoint {
            user_id,
            point,
            update_millis,
        };
        let mut records = self.records.write().await;
        records.insert(user_id, record);
        Ok(record)
    }
}

struct LogInner {
    next_id: u64,
    entries: HashMap<u64, Vec<PointHistory>>,
}

/// A thread-safe in-memory history table.
///
/// Entry ids are assigned from a counter advanced under the table's write
/// lock, so ids are globally unique and id order matches insertion order.
#[derive(Clone)]
pub struct InMemoryHistoryLog {
    inner: Arc<RwLock<LogInner>>,
}

impl InMemoryHistoryLog {
    /// Creates a new, empty history log.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LogInner {
                next_id: 1,
                entries: HashMap::new(),
            })),
        }
    }
}

impl Default for InMemoryHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryLog for InMemoryHistoryLog {
    async fn append(
        &self,
        user_id: u64,
        amount: i64,
        kind: TransactionKind,
        update_millis: i64,
    ) -> Result<PointHistory> {
        let mut inner = self.inner.write().await;
        let entry = PointHistory {
            id: inner.next_id,
            user_id,
            amount,
            kind,
            update_millis,
        };
        inner.next_id += 1;
        inner.entries.entry(user_id).or_default().push(entry);
        Ok(entry)
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<PointHistory>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(&user_id).cloned().unwrap_or_default())
    }
}
