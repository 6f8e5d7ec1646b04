use crate::domain::point::{Amount, MAX_POINT, PointHistory, TransactionKind, UserPoint};
use crate::domain::ports::{BalanceStoreBox, HistoryLogBox};
use crate::error::{LedgerError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The sole entry point for mutating user balances.
///
/// `PointLedger` owns the storage backends and guarantees that exactly one
/// charge or use operation is in flight per user: the critical section
/// spans read, validation, balance write, and history append, so no caller
/// observes intermediate state. Operations on different users proceed
/// concurrently.
pub struct PointLedger {
    balance_store: BalanceStoreBox,
    history_log: HistoryLogBox,
    user_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl PointLedger {
    /// Creates a new `PointLedger` instance.
    ///
    /// # Arguments
    ///
    /// * `balance_store` - The store for current balances.
    /// * `history_log` - The append-only transaction history.
    pub fn new(balance_store: BalanceStoreBox, history_log: HistoryLogBox) -> Self {
        Self {
            balance_store,
            history_log,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Increases the user's balance and records a `Charge` entry.
    ///
    /// Fails with [`LedgerError::InvalidAmount`] for non-positive amounts
    /// and [`LedgerError::Overflow`] when the balance would exceed
    /// [`MAX_POINT`]; neither failure touches balance or history.
    pub async fn charge(&self, user_id: u64, amount: i64) -> Result<UserPoint> {
        let amount = match Amount::new(amount) {
            Ok(amount) => amount,
            Err(err) => {
                warn!(user_id, amount, "charge rejected: non-positive amount");
                return Err(err);
            }
        };

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        let current = self.balance_store.read(user_id).await?;
        // Checked by subtraction against the maximum; summing first could wrap.
        if amount.value() > MAX_POINT - current.point {
            warn!(
                user_id,
                point = current.point,
                amount = amount.value(),
                "charge rejected: balance would exceed the maximum"
            );
            return Err(LedgerError::Overflow {
                point: current.point,
                amount: amount.value(),
            });
        }

        let updated = self
            .apply(current, current.point + amount.value(), amount, TransactionKind::Charge)
            .await?;
        info!(
            user_id,
            charged = amount.value(),
            point = updated.point,
            "charge applied"
        );
        Ok(updated)
    }

    /// Decreases the user's balance and records a `Use` entry.
    ///
    /// Fails with [`LedgerError::InvalidAmount`] for non-positive amounts
    /// and [`LedgerError::InsufficientBalance`] when the amount exceeds
    /// the current balance; neither failure touches balance or history.
    pub async fn use_points(&self, user_id: u64, amount: i64) -> Result<UserPoint> {
        let amount = match Amount::new(amount) {
            Ok(amount) => amount,
            Err(err) => {
                warn!(user_id, amount, "use rejected: non-positive amount");
                return Err(err);
            }
        };

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        // The balance check must happen after the authoritative read under
        // the lock; checking earlier reintroduces the lost-update race.
        let current = self.balance_store.read(user_id).await?;
        if amount.value() > current.point {
            warn!(
                user_id,
                point = current.point,
                amount = amount.value(),
                "use rejected: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                point: current.point,
                amount: amount.value(),
            });
        }

        let updated = self
            .apply(current, current.point - amount.value(), amount, TransactionKind::Use)
            .await?;
        info!(
            user_id,
            used = amount.value(),
            point = updated.point,
            "use applied"
        );
        Ok(updated)
    }

    /// Returns the user's current balance record. Pure read; unknown users
    /// read as a zero-balance record.
    pub async fn balance(&self, user_id: u64) -> Result<UserPoint> {
        self.balance_store.read(user_id).await
    }

    /// Returns the user's history entries in application order.
    pub async fn history(&self, user_id: u64) -> Result<Vec<PointHistory>> {
        self.history_log.list_by_user(user_id).await
    }

    /// Writes the new balance and its history entry as one unit. Callers
    /// must hold the user's lock; the history entry reuses the balance
    /// record's timestamp so id order and timestamp order agree.
    async fn apply(
        &self,
        current: UserPoint,
        new_point: i64,
        amount: Amount,
        kind: TransactionKind,
    ) -> Result<UserPoint> {
        // Strictly increasing per user even when the clock stalls.
        let update_millis = Utc::now()
            .timestamp_millis()
            .max(current.update_millis + 1);
        let updated = self
            .balance_store
            .write(current.user_id, new_point, update_millis)
            .await?;
        self.history_log
            .append(current.user_id, amount.value(), kind, update_millis)
            .await?;
        Ok(updated)
    }

    /// Returns the user's mutation lock, creating it on first use.
    async fn user_lock(&self, user_id: u64) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }
}
