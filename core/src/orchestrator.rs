//! # Scan Orchestrator
//!
//! Drives a scan through its stages: expanding targets, discovering hosts,
//! port-scanning, classifying, done. Each stage fully drains before the next
//! starts, because port scanning needs the complete alive set and
//! classification needs complete open-port lists.
//!
//! The orchestrator always hands back a [`ScanResult`]: empty when nothing
//! answered, partial when the scan was cancelled mid-flight. No per-target
//! failure is ever fatal.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use sweepr_common::config::ScanConfig;
use sweepr_common::network::host::ScanResult;
use sweepr_common::network::range::HostAddrs;

use crate::classify::{self, Evidence};
use crate::discovery;
use crate::portscan;
use crate::probe::{Prober, TcpProber};
use crate::scheduler::Pool;

/// Ranges at or below this size may be shuffled for stealth scans; larger
/// ranges stay lazy and sequential.
const MAX_SHUFFLE_TARGETS: u64 = 65_536;

/// Progress notifications, one per completed host per stage.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent {
    HostDiscovered { addr: Ipv4Addr, rtt: Duration },
    HostScanned { addr: Ipv4Addr, open_ports: usize },
}

pub type ProgressFn = dyn Fn(&ScanEvent) + Send + Sync;

/// Stage marker, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Expanding,
    Discovering,
    PortScanning,
    Classifying,
    Done,
}

/// The scan engine. One instance drives one scan at a time; the
/// configuration is immutable for the scan's duration.
pub struct ScanEngine {
    config: ScanConfig,
    prober: Arc<dyn Prober>,
    cancel: CancellationToken,
    progress: Option<Arc<ProgressFn>>,
}

impl ScanEngine {
    /// Engine with the production prober; the ICMP capability check runs
    /// here, once, blocking briefly.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_prober(config, Arc::new(TcpProber::detect()))
    }

    pub fn with_prober(config: ScanConfig, prober: Arc<dyn Prober>) -> Self {
        Self {
            config,
            prober,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Token callers can clone to cancel the scan externally (e.g. from an
    /// interrupt handler). Completed hosts survive cancellation.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn on_progress(mut self, callback: impl Fn(&ScanEvent) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Whether liveness runs degraded (TCP fallback instead of ICMP).
    pub fn fallback_mode(&self) -> bool {
        self.prober.fallback_mode()
    }

    /// Runs the full scan against `range`. Always returns a result.
    pub async fn run(&self, range: HostAddrs) -> ScanResult {
        let started = Utc::now();
        let mut phase = ScanPhase::Expanding;
        info!(target_range = %range, profile = %self.config.profile, "scan starting");
        debug!(?phase, candidates = range.len());

        let host_pool = Pool::new(self.config.host_concurrency, self.cancel.clone())
            .with_delay(self.config.probe_delay);
        let port_pool = Pool::new(self.config.port_concurrency, self.cancel.clone())
            .with_delay(self.config.probe_delay);

        phase = ScanPhase::Discovering;
        debug!(?phase, targets = range.len());
        let mut hosts = if self.config.randomize && range.len() <= MAX_SHUFFLE_TARGETS {
            let mut targets: Vec<Ipv4Addr> = range.iter().collect();
            targets.shuffle(&mut rand::rng());
            discovery::discover_hosts(
                self.prober.clone(),
                targets,
                &self.config,
                &host_pool,
                self.progress.clone(),
            )
            .await
        } else {
            discovery::discover_hosts(
                self.prober.clone(),
                range.iter(),
                &self.config,
                &host_pool,
                self.progress.clone(),
            )
            .await
        };
        hosts.sort_by_key(|h| h.addr);
        info!(alive = hosts.len(), "discovery complete");

        phase = ScanPhase::PortScanning;
        debug!(?phase);
        let discovered = hosts.clone();
        let scanned = portscan::scan_ports(
            self.prober.clone(),
            hosts,
            &self.config,
            &host_pool,
            &port_pool,
            self.progress.clone(),
        )
        .await;

        phase = ScanPhase::Classifying;
        debug!(?phase);
        let mut hosts: Vec<_> = scanned
            .into_iter()
            .map(|scanned| {
                let mut record = scanned.record;
                let verdict = classify::classify(&Evidence {
                    addr: record.addr,
                    open_ports: &record.open_ports,
                    banners: &scanned.banners,
                    rtt: record.rtt,
                    vendor: record.vendor.as_deref(),
                });
                record.device = verdict.device;
                record.services = verdict.services;
                record
            })
            .collect();

        // A cancellation can stop the port-scan stage before every host's
        // scan dispatched. Discovered hosts whose scan never ran are carried
        // through unchanged instead of being dropped.
        let scanned_addrs: HashSet<Ipv4Addr> = hosts.iter().map(|h| h.addr).collect();
        hosts.extend(
            discovered
                .into_iter()
                .filter(|record| !scanned_addrs.contains(&record.addr)),
        );
        hosts.sort_by_key(|h| h.addr);

        phase = ScanPhase::Done;
        let partial = self.cancel.is_cancelled();
        let finished = Utc::now();
        info!(
            ?phase,
            hosts = hosts.len(),
            partial,
            elapsed = ?(finished - started).to_std().unwrap_or_default(),
            "scan finished"
        );

        ScanResult {
            hosts,
            started,
            finished,
            profile: self.config.profile,
            target: range.to_string(),
            fallback_ping: self.prober.fallback_mode(),
            partial,
        }
    }
}
