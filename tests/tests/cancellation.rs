//! Cancellation mid-scan must preserve completed hosts and never corrupt
//! or duplicate probe results.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::config::{ScanConfig, ScanProfile};
use sweepr_common::network::range::HostAddrs;
use sweepr_core::ScanEngine;
use sweepr_testkit::FakeProber;

#[tokio::test]
async fn cancellation_mid_port_scan_keeps_completed_hosts() {
    // Three fast hosts and one whose port probes hang far beyond the test.
    let prober = FakeProber::new()
        .host([10, 0, 0, 1], 1)
        .with_open([10, 0, 0, 1], &[22])
        .host([10, 0, 0, 2], 1)
        .with_open([10, 0, 0, 2], &[80, 443])
        .host([10, 0, 0, 3], 1)
        .host([10, 0, 0, 4], 1)
        .with_slow_ports([10, 0, 0, 4]);

    let engine = ScanEngine::with_prober(
        ScanConfig::for_profile(ScanProfile::Quick),
        Arc::new(prober),
    );
    let cancel = engine.cancel_token();

    let scan = tokio::spawn(async move {
        let range: HostAddrs = "10.0.0.0/29".parse().unwrap();
        engine.run(range).await
    });

    // Give discovery and the fast hosts time to finish, then pull the plug
    // while the slow host is still mid-port-scan.
    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), scan)
        .await
        .expect("cancelled scan must return promptly")
        .unwrap();

    assert!(result.partial);

    // The three completed hosts are intact.
    let by_addr = |last: u8| {
        result
            .hosts
            .iter()
            .find(|h| h.addr == Ipv4Addr::new(10, 0, 0, last))
    };
    assert_eq!(by_addr(1).expect("host .1").open_ports, vec![22]);
    assert_eq!(by_addr(2).expect("host .2").open_ports, vec![80, 443]);
    assert!(by_addr(3).expect("host .3").open_ports.is_empty());

    // The half-scanned host may be present or absent; if present, its
    // ports are a clean subset with no duplicates.
    if let Some(host) = by_addr(4) {
        let unique: HashSet<u16> = host.open_ports.iter().copied().collect();
        assert_eq!(unique.len(), host.open_ports.len());
    }

    // Nothing is duplicated across the result set.
    let addrs: HashSet<Ipv4Addr> = result.hosts.iter().map(|h| h.addr).collect();
    assert_eq!(addrs.len(), result.hosts.len());
}

#[tokio::test]
async fn cancellation_before_discovery_yields_an_empty_partial_result() {
    let prober = FakeProber::new().host([10, 0, 0, 1], 1);
    let engine = ScanEngine::with_prober(
        ScanConfig::for_profile(ScanProfile::Quick),
        Arc::new(prober),
    );
    engine.cancel_token().cancel();

    let range: HostAddrs = "10.0.0.0/24".parse().unwrap();
    let result = engine.run(range).await;

    assert!(result.partial);
    assert!(result.hosts.is_empty());
}

#[tokio::test]
async fn cancellation_mid_discovery_keeps_already_discovered_hosts() {
    // One target answers liveness instantly; the rest of the /29 hang, so
    // the cancel lands while discovery is still in flight and the port
    // scan never dispatches for anyone.
    let prober = FakeProber::new().host([10, 0, 0, 1], 1).hang_silent_hosts();
    let engine = ScanEngine::with_prober(
        ScanConfig::for_profile(ScanProfile::Quick),
        Arc::new(prober),
    );
    let cancel = engine.cancel_token();

    let scan = tokio::spawn(async move {
        let range: HostAddrs = "10.0.0.0/29".parse().unwrap();
        engine.run(range).await
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), scan)
        .await
        .expect("cancelled scan must return promptly")
        .unwrap();

    assert!(result.partial);
    let host = result
        .hosts
        .iter()
        .find(|h| h.addr == Ipv4Addr::new(10, 0, 0, 1))
        .expect("discovered host must survive cancellation");
    assert!(host.open_ports.is_empty());
    assert_eq!(host.device, "Unknown");
}
