//! # Probe Primitives
//!
//! Single-target, single-attempt operations: liveness check, TCP connect on
//! one port, and a non-intrusive banner read. Each is bounded by an explicit
//! timeout and safe to run concurrently; none shares mutable state.
//!
//! Liveness prefers the system's ICMP echo (`ping`). Where that capability is
//! missing the prober degrades to TCP connect attempts against a small set of
//! commonly open ports; a refused connection still proves the host is up.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use sweepr_common::network::host::{LivenessStatus, PortResult, PortState};
use sweepr_common::ports::LIVENESS_FALLBACK_PORTS;

const BANNER_READ_LIMIT: usize = 1024;

/// The seam between the scan stages and the wire. Implementations must be
/// stateless with respect to individual probes.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn liveness(&self, addr: Ipv4Addr, timeout: Duration) -> LivenessStatus;

    async fn port(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> PortResult;

    /// Read whatever the service volunteers, nudging with at most a newline.
    /// No bytes is not an error; the banner is simply absent.
    async fn banner(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> Option<String>;

    /// True when liveness runs on the TCP-connect fallback instead of ICMP.
    fn fallback_mode(&self) -> bool {
        false
    }
}

/// The production prober: system `ping` for liveness when available, plain
/// `TcpStream` connects for everything else.
pub struct TcpProber {
    fallback_ping: bool,
    fallback_ports: Vec<u16>,
}

impl TcpProber {
    /// Probes the local ICMP capability once and picks the liveness strategy
    /// for the whole scan.
    pub fn detect() -> Self {
        let fallback = !ping_works();
        if fallback {
            debug!("ICMP echo unavailable, liveness degrades to TCP connect");
        }
        Self {
            fallback_ping: fallback,
            fallback_ports: LIVENESS_FALLBACK_PORTS.to_vec(),
        }
    }

    /// Force the TCP fallback with a custom port set. Used by the tests to
    /// point liveness at loopback listeners.
    pub fn with_fallback_ports(ports: Vec<u16>) -> Self {
        Self {
            fallback_ping: true,
            fallback_ports: ports,
        }
    }

    async fn ping_liveness(&self, addr: Ipv4Addr, limit: Duration) -> LivenessStatus {
        let wait_secs = limit.as_secs().max(1).to_string();
        let started = Instant::now();

        let child = tokio::process::Command::new("ping")
            .args(["-c", "1", "-W", &wait_secs, &addr.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        // Small grace on top of ping's own wait so we reap the exit status.
        match timeout(limit + Duration::from_millis(500), child).await {
            Ok(Ok(status)) if status.success() => LivenessStatus::Alive {
                rtt: started.elapsed(),
            },
            _ => LivenessStatus::Down,
        }
    }

    async fn connect_liveness(&self, addr: Ipv4Addr, limit: Duration) -> LivenessStatus {
        for &port in &self.fallback_ports {
            let target = SocketAddrV4::new(addr, port);
            let started = Instant::now();
            match timeout(limit, TcpStream::connect(SocketAddr::V4(target))).await {
                Ok(Ok(_)) => {
                    return LivenessStatus::Alive {
                        rtt: started.elapsed(),
                    };
                }
                // An active refusal is a response: the host is up even
                // though the port is closed.
                Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                    return LivenessStatus::Alive {
                        rtt: started.elapsed(),
                    };
                }
                Ok(Err(e)) => {
                    trace!("liveness connect {target}: {e}");
                }
                Err(_) => {}
            }
        }
        LivenessStatus::Down
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn liveness(&self, addr: Ipv4Addr, limit: Duration) -> LivenessStatus {
        if self.fallback_ping {
            self.connect_liveness(addr, limit).await
        } else {
            self.ping_liveness(addr, limit).await
        }
    }

    async fn port(&self, addr: Ipv4Addr, port: u16, limit: Duration) -> PortResult {
        let target = SocketAddr::V4(SocketAddrV4::new(addr, port));
        let started = Instant::now();

        match timeout(limit, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                let mut result = PortResult::new(port, PortState::Open);
                result.latency = Some(started.elapsed());
                result
            }
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                PortResult::new(port, PortState::Closed)
            }
            // Anything short of a refusal gave us no answer from the host.
            Ok(Err(_)) | Err(_) => PortResult::new(port, PortState::Filtered),
        }
    }

    async fn banner(&self, addr: Ipv4Addr, port: u16, limit: Duration) -> Option<String> {
        let target = SocketAddr::V4(SocketAddrV4::new(addr, port));
        let mut stream = timeout(limit, TcpStream::connect(target)).await.ok()?.ok()?;
        let mut buf = vec![0u8; BANNER_READ_LIMIT];

        // Most banner protocols speak first; give them half the window.
        let read_window = limit / 2;
        let n = match timeout(read_window, stream.read(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => n,
            _ => {
                // Shy protocols need a nudge, never a payload.
                timeout(read_window, stream.write_all(b"\r\n")).await.ok()?.ok()?;
                match timeout(read_window, stream.read(&mut buf)).await {
                    Ok(Ok(n)) if n > 0 => n,
                    _ => return None,
                }
            }
        };

        let text = String::from_utf8_lossy(&buf[..n]);
        let line = text.lines().next().unwrap_or_default().trim().to_string();
        if line.is_empty() { None } else { Some(line) }
    }

    fn fallback_mode(&self) -> bool {
        self.fallback_ping
    }
}

/// One-shot capability check: can this process get an ICMP echo through?
fn ping_works() -> bool {
    std::process::Command::new("ping")
        .args(["-c", "1", "-W", "1", "127.0.0.1"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
