//! Domain layer: entities, value objects, the static policy table, and the
//! ports (storage and payment-gateway traits) the application layer talks to.

pub mod gateway;
pub mod meter;
pub mod policy;
pub mod ports;
pub mod property;
pub mod transaction;
pub mod user;
