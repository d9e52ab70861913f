//! Degraded-liveness behavior with the real TCP prober: refusals prove a
//! host is up, pure timeouts prove nothing.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use sweepr_common::config::{ScanConfig, ScanProfile};
use sweepr_common::network::range::HostAddrs;
use sweepr_core::{ScanEngine, TcpProber};

#[tokio::test]
async fn fallback_scan_finds_loopback_and_reports_degraded_mode() {
    // A listener we control stands in for a commonly-open port.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let prober = TcpProber::with_fallback_ports(vec![port]);
    let engine = ScanEngine::with_prober(
        ScanConfig::for_profile(ScanProfile::Quick),
        Arc::new(prober),
    );
    assert!(engine.fallback_mode());

    let range: HostAddrs = "127.0.0.1/32".parse().unwrap();
    let result = engine.run(range).await;

    assert!(result.fallback_ping);
    assert_eq!(result.hosts.len(), 1);
    assert_eq!(result.hosts[0].addr, Ipv4Addr::LOCALHOST);
    assert!(result.hosts[0].rtt.is_some());
}

#[tokio::test]
async fn all_filtered_target_never_becomes_a_host_record() {
    // TEST-NET-1: no responses, no refusals, only timeouts.
    let prober = TcpProber::with_fallback_ports(vec![80, 443, 22]);
    let config = ScanConfig::for_profile(ScanProfile::Quick)
        .with_liveness_timeout(Duration::from_millis(300));
    let engine = ScanEngine::with_prober(config, Arc::new(prober));

    let range: HostAddrs = "192.0.2.1/32".parse().unwrap();
    let result = engine.run(range).await;

    assert!(result.hosts.is_empty());
    assert_eq!(result.total_open_ports(), 0);
    assert!(!result.partial);
}
