//! Adapters for the domain ports: in-memory stores, the keyed lock registry,
//! and a sandbox payment gateway.

pub mod in_memory;
pub mod locks;
pub mod sandbox;
