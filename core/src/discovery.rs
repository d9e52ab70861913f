//! # Host Discovery Stage
//!
//! Sweeps the expanded target sequence with liveness probes through the host
//! pool. Each host that answers becomes a [`HostRecord`] enriched, best
//! effort, with reverse DNS, ARP-table MAC and OUI vendor data. Enrichment
//! failures never drop the host.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::host::{HostRecord, LivenessStatus};
use sweepr_common::network::mac;

use crate::orchestrator::{ProgressFn, ScanEvent};
use crate::probe::Prober;
use crate::scheduler::Pool;

const DNS_TIMEOUT: Duration = Duration::from_secs(2);

/// Probes every target and returns the records of the alive ones,
/// unordered. The caller sorts by address for stable reporting.
pub async fn discover_hosts<I>(
    prober: Arc<dyn Prober>,
    targets: I,
    config: &ScanConfig,
    pool: &Pool,
    progress: Option<Arc<ProgressFn>>,
) -> Vec<HostRecord>
where
    I: IntoIterator<Item = Ipv4Addr>,
{
    let liveness_timeout = config.liveness_timeout;

    let records = pool
        .run(targets, move |addr| {
            let prober = prober.clone();
            let progress = progress.clone();
            async move {
                match prober.liveness(addr, liveness_timeout).await {
                    LivenessStatus::Alive { rtt } => {
                        let mut record = HostRecord::new(addr, Some(rtt));
                        enrich(&mut record).await;
                        if let Some(on_event) = progress.as_deref() {
                            on_event(&ScanEvent::HostDiscovered { addr, rtt });
                        }
                        Some(record)
                    }
                    LivenessStatus::Down => None,
                }
            }
        })
        .await;

    let hosts: Vec<HostRecord> = records.into_iter().flatten().collect();
    debug!(alive = hosts.len(), "discovery stage drained");
    hosts
}

/// Best-effort synchronous enrichment of a freshly discovered host.
async fn enrich(record: &mut HostRecord) {
    record.hostname = resolve_hostname(record.addr).await;

    if let Some(mac_addr) = mac::arp_lookup(record.addr) {
        record.vendor = mac::vendor_for(&mac_addr);
        record.mac = Some(mac_addr);
    }
}

/// Reverse DNS through the system resolver. The lookup is blocking, so it
/// runs on the blocking pool under its own timeout.
async fn resolve_hostname(addr: Ipv4Addr) -> Option<String> {
    let lookup = tokio::task::spawn_blocking(move || {
        dns_lookup::lookup_addr(&IpAddr::V4(addr)).ok()
    });

    match timeout(DNS_TIMEOUT, lookup).await {
        Ok(Ok(Some(name))) if name != addr.to_string() => Some(name),
        _ => None,
    }
}
