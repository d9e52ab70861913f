//! Test support for the integration suite: a scriptable in-memory prober
//! that simulates a network without touching any socket.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;

use sweepr_common::network::host::{LivenessStatus, PortResult, PortState};
use sweepr_core::Prober;

/// A simulated network. Hosts registered with [`FakeProber::host`] answer
/// liveness; everything else times out. Ports not listed as open are
/// refused, except on "slow" hosts whose port probes hang far beyond any
/// test timeout (for cancellation scenarios).
#[derive(Default, Clone)]
pub struct FakeProber {
    alive: HashMap<Ipv4Addr, Duration>,
    open: HashMap<Ipv4Addr, Vec<u16>>,
    banners: HashMap<(Ipv4Addr, u16), String>,
    slow: HashSet<Ipv4Addr>,
    hang_silent: bool,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, addr: [u8; 4], rtt_ms: u64) -> Self {
        self.alive
            .insert(Ipv4Addr::from(addr), Duration::from_millis(rtt_ms));
        self
    }

    pub fn with_open(mut self, addr: [u8; 4], ports: &[u16]) -> Self {
        self.open.insert(Ipv4Addr::from(addr), ports.to_vec());
        self
    }

    pub fn with_banner(mut self, addr: [u8; 4], port: u16, banner: &str) -> Self {
        self.banners
            .insert((Ipv4Addr::from(addr), port), banner.to_string());
        self
    }

    /// Port probes against this host hang until far past any test deadline.
    pub fn with_slow_ports(mut self, addr: [u8; 4]) -> Self {
        self.slow.insert(Ipv4Addr::from(addr));
        self
    }

    /// Liveness probes against unregistered hosts hang instead of answering
    /// down, pinning a scan inside its discovery stage.
    pub fn hang_silent_hosts(mut self) -> Self {
        self.hang_silent = true;
        self
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn liveness(&self, addr: Ipv4Addr, _timeout: Duration) -> LivenessStatus {
        match self.alive.get(&addr) {
            Some(&rtt) => LivenessStatus::Alive { rtt },
            None if self.hang_silent => {
                tokio::time::sleep(Duration::from_secs(300)).await;
                LivenessStatus::Down
            }
            None => LivenessStatus::Down,
        }
    }

    async fn port(&self, addr: Ipv4Addr, port: u16, _timeout: Duration) -> PortResult {
        if self.slow.contains(&addr) {
            tokio::time::sleep(Duration::from_secs(300)).await;
            return PortResult::new(port, PortState::Filtered);
        }

        let state = match self.open.get(&addr) {
            Some(ports) if ports.contains(&port) => PortState::Open,
            _ => PortState::Closed,
        };
        PortResult::new(port, state)
    }

    async fn banner(&self, addr: Ipv4Addr, port: u16, _timeout: Duration) -> Option<String> {
        self.banners.get(&(addr, port)).cloned()
    }
}
