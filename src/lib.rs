//! In-process point ledger: per-user balances with an append-only
//! transaction history, kept mutually consistent under concurrent access.
//!
//! The [`application::ledger::PointLedger`] coordinator is the only writer;
//! storage backends live behind the ports in [`domain::ports`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
