//! The sweepr scan engine: bounded-concurrency host discovery, TCP port
//! scanning and rule-based host classification.
//!
//! The engine performs no output I/O of its own; it hands a
//! [`ScanResult`](sweepr_common::network::host::ScanResult) to the caller
//! and reports live progress through an optional callback.

pub mod classify;
pub mod discovery;
pub mod orchestrator;
pub mod portscan;
pub mod probe;
pub mod scheduler;

pub use orchestrator::{ScanEngine, ScanEvent};
pub use probe::{Prober, TcpProber};
