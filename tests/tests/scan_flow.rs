//! End-to-end scan scenarios over a simulated network.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use sweepr_common::config::{ScanConfig, ScanProfile};
use sweepr_common::network::range::HostAddrs;
use sweepr_core::{ScanEngine, ScanEvent};
use sweepr_testkit::FakeProber;

fn engine_with(prober: FakeProber, profile: ScanProfile) -> ScanEngine {
    ScanEngine::with_prober(ScanConfig::for_profile(profile), Arc::new(prober))
}

#[tokio::test]
async fn quick_scan_discovers_scans_and_classifies() {
    let prober = FakeProber::new()
        .host([192, 168, 1, 10], 3)
        .with_open([192, 168, 1, 10], &[80, 22])
        .with_banner([192, 168, 1, 10], 22, "SSH-2.0-OpenSSH_8.9")
        .host([192, 168, 1, 5], 1)
        .with_open([192, 168, 1, 5], &[139, 445, 3389]);

    let range: HostAddrs = "192.168.1.0/24".parse().unwrap();
    let result = engine_with(prober, ScanProfile::Quick).run(range).await;

    assert!(!result.partial);
    assert_eq!(result.hosts.len(), 2);
    assert_eq!(result.total_open_ports(), 5);

    // Stable ordering despite unordered probe completion.
    let addrs: Vec<Ipv4Addr> = result.hosts.iter().map(|h| h.addr).collect();
    assert_eq!(
        addrs,
        vec![
            Ipv4Addr::new(192, 168, 1, 5),
            Ipv4Addr::new(192, 168, 1, 10),
        ]
    );

    let windows = &result.hosts[0];
    assert_eq!(windows.open_ports, vec![139, 445, 3389]);
    assert_eq!(windows.device, "Windows (RDP enabled)");

    let linux = &result.hosts[1];
    assert_eq!(linux.open_ports, vec![22, 80]);
    assert_eq!(linux.device, "Linux/Unix");
    assert_eq!(linux.services.get(&22).map(String::as_str), Some("ssh"));
    assert!(linux.rtt.is_some());
}

#[tokio::test]
async fn silent_hosts_never_enter_the_result_set() {
    // One real host in the /29; the rest answer nothing.
    let prober = FakeProber::new().host([10, 0, 0, 2], 1);

    let range: HostAddrs = "10.0.0.0/29".parse().unwrap();
    let result = engine_with(prober, ScanProfile::Quick).run(range).await;

    assert_eq!(result.hosts.len(), 1);
    assert_eq!(result.hosts[0].addr, Ipv4Addr::new(10, 0, 0, 2));
}

#[tokio::test]
async fn alive_host_with_no_open_ports_is_retained() {
    let prober = FakeProber::new().host([10, 0, 0, 2], 1);

    let range: HostAddrs = "10.0.0.2/32".parse().unwrap();
    let result = engine_with(prober, ScanProfile::Quick).run(range).await;

    assert_eq!(result.hosts.len(), 1);
    assert!(result.hosts[0].open_ports.is_empty());
    assert_eq!(result.hosts[0].device, "Unknown");
    assert_eq!(result.total_open_ports(), 0);
}

#[tokio::test]
async fn progress_fires_once_per_host_per_stage() {
    let prober = FakeProber::new()
        .host([10, 0, 0, 1], 1)
        .host([10, 0, 0, 3], 1)
        .with_open([10, 0, 0, 3], &[22]);

    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_with(prober, ScanProfile::Quick).on_progress({
        let events = events.clone();
        move |event| {
            let tag = match event {
                ScanEvent::HostDiscovered { .. } => "discovered",
                ScanEvent::HostScanned { .. } => "scanned",
            };
            events.lock().unwrap().push(tag);
        }
    });

    let range: HostAddrs = "10.0.0.0/29".parse().unwrap();
    let result = engine.run(range).await;
    assert_eq!(result.hosts.len(), 2);

    let events = events.lock().unwrap();
    assert_eq!(events.iter().filter(|t| **t == "discovered").count(), 2);
    assert_eq!(events.iter().filter(|t| **t == "scanned").count(), 2);
}

#[tokio::test]
async fn stealth_profile_still_produces_ordered_results() {
    let mut prober = FakeProber::new();
    for last in [2u8, 4, 6] {
        prober = prober
            .host([172, 16, 0, last], 1)
            .with_open([172, 16, 0, last], &[22]);
    }

    // Stealth randomizes probe order and skips banners; the report must
    // come out sorted regardless.
    let mut config = ScanConfig::for_profile(ScanProfile::Stealth);
    config.probe_delay = None; // keep the test fast
    let engine = ScanEngine::with_prober(config, Arc::new(prober));

    let range: HostAddrs = "172.16.0.0/28".parse().unwrap();
    let result = engine.run(range).await;

    let addrs: Vec<Ipv4Addr> = result.hosts.iter().map(|h| h.addr).collect();
    assert_eq!(
        addrs,
        vec![
            Ipv4Addr::new(172, 16, 0, 2),
            Ipv4Addr::new(172, 16, 0, 4),
            Ipv4Addr::new(172, 16, 0, 6),
        ]
    );
    // No banner probes in stealth: port-only evidence still classifies.
    assert!(result.hosts.iter().all(|h| h.device == "Linux/Unix"));
}
