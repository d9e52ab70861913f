//! # Port Scan Stage
//!
//! For every alive host, probes the active profile's port set through the
//! port pool, optionally chaining a banner read on open banner-friendly
//! ports. Open ports are folded into the host record in ascending order; a
//! host with zero open ports is still meaningful and kept.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::debug;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::host::HostRecord;
use sweepr_common::ports::BANNER_PORTS;

use crate::orchestrator::{ProgressFn, ScanEvent};
use crate::probe::Prober;
use crate::scheduler::Pool;

/// A port-scanned host together with the banners collected along the way.
/// The banner map is classification evidence, not part of the final record.
pub struct ScannedHost {
    pub record: HostRecord,
    pub banners: BTreeMap<u16, String>,
}

/// Scans the port set of every host, bounded by the host pool on the
/// outside and a per-host port pool on the inside.
pub async fn scan_ports(
    prober: Arc<dyn Prober>,
    hosts: Vec<HostRecord>,
    config: &ScanConfig,
    host_pool: &Pool,
    port_pool: &Pool,
    progress: Option<Arc<ProgressFn>>,
) -> Vec<ScannedHost> {
    let ports = config.ports();
    let config = config.clone();

    let scanned = host_pool
        .run(hosts, move |record| {
            let prober = prober.clone();
            let progress = progress.clone();
            let port_pool = port_pool.clone();
            let config = config.clone();
            let mut ports = ports.clone();
            async move {
                if config.randomize {
                    ports.shuffle(&mut rand::rng());
                }
                let scanned = scan_host(prober, record, ports, &config, &port_pool).await;
                if let Some(on_event) = progress.as_deref() {
                    on_event(&ScanEvent::HostScanned {
                        addr: scanned.record.addr,
                        open_ports: scanned.record.open_ports.len(),
                    });
                }
                scanned
            }
        })
        .await;

    debug!(hosts = scanned.len(), "port-scan stage drained");
    scanned
}

async fn scan_host(
    prober: Arc<dyn Prober>,
    mut record: HostRecord,
    ports: Vec<u16>,
    config: &ScanConfig,
    port_pool: &Pool,
) -> ScannedHost {
    let addr = record.addr;
    let port_timeout = config.port_timeout;
    let banner_timeout = config.banner_timeout;
    let grab_banners = config.grab_banners;

    let results = port_pool
        .run(ports, move |port| {
            let prober = prober.clone();
            async move {
                let mut result = prober.port(addr, port, port_timeout).await;
                if result.is_open() && grab_banners && BANNER_PORTS.contains(&port) {
                    result.banner = prober.banner(addr, port, banner_timeout).await;
                }
                result
            }
        })
        .await;

    let mut banners = BTreeMap::new();
    for result in results {
        if result.is_open() {
            record.add_open_port(result.port);
            if let Some(banner) = result.banner {
                banners.insert(result.port, banner);
            }
        }
    }

    ScannedHost { record, banners }
}
