//! Application layer: the services orchestrating the domain ports.
//!
//! Every mutating entry point checks the caller's [`Identity`] against the
//! [`PolicyEngine`] before touching state.
//!
//! [`Identity`]: crate::domain::user::Identity
//! [`PolicyEngine`]: crate::domain::policy::PolicyEngine

pub mod admin;
pub mod ledger;
pub mod metering;
pub mod purchase;
pub mod settings;
pub mod verification;
