//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `PointLedger` coordinator, the sole component
//! allowed to mutate the balance and history stores. It serializes
//! mutations per user with lazily created `tokio` mutexes so unrelated
//! users never contend.

pub mod ledger;
