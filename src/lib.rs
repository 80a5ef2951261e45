//! Authorization and prepaid transaction core for a prepaid water-metering
//! service.
//!
//! Every mutating operation takes an explicit caller [`domain::user::Identity`]
//! and is gated by the static role/permission table in [`domain::policy`].
//! Meter balances are only ever written by the [`application::ledger::Ledger`],
//! driven by gateway-reconciled transactions in
//! [`application::purchase::TransactionOrchestrator`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
