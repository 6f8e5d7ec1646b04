use point_ledger::application::ledger::PointLedger;
use point_ledger::infrastructure::in_memory::{InMemoryBalanceStore, InMemoryHistoryLog};
use std::sync::Arc;

/// Builds an isolated ledger over fresh in-memory stores.
pub fn new_ledger() -> Arc<PointLedger> {
    Arc::new(PointLedger::new(
        Box::new(InMemoryBalanceStore::new()),
        Box::new(InMemoryHistoryLog::new()),
    ))
}
