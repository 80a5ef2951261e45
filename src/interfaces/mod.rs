//! Interface layer for the scenario binary: a JSON-lines event reader, the
//! runner that replays events against the core, and a JSON report writer.

pub mod report;
pub mod runner;
pub mod scenario;
