//! Scan profiles and the resolved per-scan configuration.
//!
//! A [`ScanProfile`] bundles the port set, timing and concurrency policy of a
//! scan. Exactly one profile is active per scan; callers may override the
//! individual knobs through [`ScanConfig`] without touching the profile.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::QUICK_PORTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanProfile {
    /// 17 well-known ports, short timeouts, high concurrency.
    Quick,
    /// Ports 1-1024.
    Full,
    /// Ports 1-65535.
    All,
    /// 17 well-known ports, low concurrency, jittered inter-probe delay,
    /// randomized probe order, no banner grabbing.
    Stealth,
}

impl ScanProfile {
    /// The port set probed on every alive host.
    pub fn ports(self) -> Vec<u16> {
        match self {
            Self::Quick | Self::Stealth => QUICK_PORTS.to_vec(),
            Self::Full => (1..=1024).collect(),
            Self::All => (1..=u16::MAX).collect(),
        }
    }

    fn host_concurrency(self) -> usize {
        match self {
            Self::Stealth => 10,
            _ => 100,
        }
    }

    fn port_concurrency(self) -> usize {
        match self {
            Self::Stealth => 5,
            _ => 50,
        }
    }

    fn liveness_timeout(self) -> Duration {
        match self {
            Self::Stealth => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        }
    }

    fn port_timeout(self) -> Duration {
        match self {
            Self::Stealth => Duration::from_secs(1),
            _ => Duration::from_millis(500),
        }
    }

    /// Base delay inserted between probe dispatches; jittered at runtime.
    fn probe_delay(self) -> Option<Duration> {
        match self {
            Self::Stealth => Some(Duration::from_millis(250)),
            _ => None,
        }
    }
}

impl fmt::Display for ScanProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quick => "quick",
            Self::Full => "full",
            Self::All => "all",
            Self::Stealth => "stealth",
        };
        f.write_str(name)
    }
}

impl FromStr for ScanProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "full" => Ok(Self::Full),
            "all" => Ok(Self::All),
            "stealth" => Ok(Self::Stealth),
            other => Err(format!("unknown scan profile: {other}")),
        }
    }
}

/// Resolved configuration for a single scan.
///
/// Built from a profile's defaults; individual knobs can be overridden
/// afterwards. Immutable once the scan starts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub profile: ScanProfile,
    /// Upper bound on simultaneous liveness probes.
    pub host_concurrency: usize,
    /// Upper bound on simultaneous port probes, per host batch.
    pub port_concurrency: usize,
    pub liveness_timeout: Duration,
    pub port_timeout: Duration,
    pub banner_timeout: Duration,
    /// Inter-probe delay for load evasion; `None` for full-speed scans.
    pub probe_delay: Option<Duration>,
    /// Shuffle target and port order before probing.
    pub randomize: bool,
    /// Chain a banner read after each open-port hit on banner-friendly ports.
    pub grab_banners: bool,
}

impl ScanConfig {
    pub fn for_profile(profile: ScanProfile) -> Self {
        Self {
            profile,
            host_concurrency: profile.host_concurrency(),
            port_concurrency: profile.port_concurrency(),
            liveness_timeout: profile.liveness_timeout(),
            port_timeout: profile.port_timeout(),
            banner_timeout: Duration::from_secs(1),
            probe_delay: profile.probe_delay(),
            randomize: profile == ScanProfile::Stealth,
            grab_banners: profile != ScanProfile::Stealth,
        }
    }

    pub fn with_host_concurrency(mut self, limit: usize) -> Self {
        self.host_concurrency = limit.max(1);
        self
    }

    pub fn with_port_concurrency(mut self, limit: usize) -> Self {
        self.port_concurrency = limit.max(1);
        self
    }

    pub fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }

    pub fn with_liveness_timeout(mut self, timeout: Duration) -> Self {
        self.liveness_timeout = timeout;
        self
    }

    pub fn with_probe_delay(mut self, delay: Option<Duration>) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn ports(&self) -> Vec<u16> {
        self.profile.ports()
    }
}
