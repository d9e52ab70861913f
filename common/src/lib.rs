//! Shared building blocks for the sweepr workspace: the scan data model,
//! target expansion, port tables, configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod network;
pub mod ports;
