//! # Scan Data Model
//!
//! The records produced by a scan: liveness outcomes, per-port evidence,
//! per-host profiles and the final aggregate handed back to the caller.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScanProfile;

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessStatus {
    Alive { rtt: Duration },
    Down,
}

impl LivenessStatus {
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive { .. })
    }
}

/// Observed state of one (host, port) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// Connection accepted.
    Open,
    /// Connection actively refused.
    Closed,
    /// No response before the timeout, typically a silently dropping firewall.
    Filtered,
}

/// Evidence from a single port probe. Ephemeral: folded into the owning
/// [`HostRecord`] and dropped.
#[derive(Debug, Clone)]
pub struct PortResult {
    pub port: u16,
    pub state: PortState,
    pub banner: Option<String>,
    pub latency: Option<Duration>,
}

impl PortResult {
    pub fn new(port: u16, state: PortState) -> Self {
        Self {
            port,
            state,
            banner: None,
            latency: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// A discovered live host and everything learned about it.
///
/// Created the moment a liveness probe succeeds, mutated by the port-scan
/// stage and the classifier, immutable once the scan completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRecord {
    pub addr: Ipv4Addr,
    /// Round-trip time of the successful liveness probe.
    pub rtt: Option<Duration>,
    pub hostname: Option<String>,
    /// Populated only when local-subnet ARP data is available.
    pub mac: Option<String>,
    pub vendor: Option<String>,
    /// Strictly ascending, no duplicates.
    pub open_ports: Vec<u16>,
    /// Best-guess OS/device label; "Unknown" until classified.
    pub device: String,
    /// Service labels keyed by port.
    pub services: BTreeMap<u16, String>,
}

impl HostRecord {
    pub fn new(addr: Ipv4Addr, rtt: Option<Duration>) -> Self {
        Self {
            addr,
            rtt,
            hostname: None,
            mac: None,
            vendor: None,
            open_ports: Vec::new(),
            device: "Unknown".to_string(),
            services: BTreeMap::new(),
        }
    }

    /// Inserts an open port, keeping the list sorted and duplicate-free.
    pub fn add_open_port(&mut self, port: u16) {
        if let Err(pos) = self.open_ports.binary_search(&port) {
            self.open_ports.insert(pos, port);
        }
    }
}

/// The final aggregate of a scan. Always produced, even when empty or cut
/// short by cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Discovered hosts, sorted by address for stable reporting.
    pub hosts: Vec<HostRecord>,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub profile: ScanProfile,
    /// The target specification as given by the caller.
    pub target: String,
    /// True when liveness ran on the TCP-connect fallback instead of ICMP,
    /// so callers can explain degraded accuracy.
    pub fallback_ping: bool,
    /// True when the scan was cancelled and the result covers only the
    /// hosts completed so far.
    pub partial: bool,
}

impl ScanResult {
    /// Derived rather than stored, so it can never drift from the host list.
    pub fn total_open_ports(&self) -> usize {
        self.hosts.iter().map(|h| h.open_ports.len()).sum()
    }

    pub fn duration(&self) -> Duration {
        (self.finished - self.started).to_std().unwrap_or_default()
    }
}
