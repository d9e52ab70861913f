use clap::{Parser, Subcommand, ValueEnum};

use sweepr_common::config::ScanProfile;

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(about = "Fast concurrent IPv4 network reconnaissance.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Write the results to a timestamped file after the scan
    #[arg(long, value_enum, global = true)]
    pub export: Option<ExportFormat>,

    /// Override the number of simultaneous liveness probes
    #[arg(long, global = true)]
    pub host_concurrency: Option<usize>,

    /// Override the number of simultaneous port probes per host
    #[arg(long, global = true)]
    pub port_concurrency: Option<usize>,

    /// Override the per-port probe timeout, in milliseconds
    #[arg(long, global = true)]
    pub port_timeout_ms: Option<u64>,

    /// Override the stealth inter-probe delay, in milliseconds
    #[arg(long, global = true)]
    pub probe_delay_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discovery plus a scan of 17 well-known ports
    #[command(alias = "q")]
    Quick { target: String },
    /// Discovery plus a scan of ports 1-1024
    #[command(alias = "f")]
    Full { target: String },
    /// Discovery plus a scan of every port
    #[command(alias = "a")]
    All { target: String },
    /// Slow, jittered, randomized scan for a low network footprint
    #[command(alias = "st")]
    Stealth { target: String },
}

impl Commands {
    pub fn profile(&self) -> ScanProfile {
        match self {
            Self::Quick { .. } => ScanProfile::Quick,
            Self::Full { .. } => ScanProfile::Full,
            Self::All { .. } => ScanProfile::All,
            Self::Stealth { .. } => ScanProfile::Stealth,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Quick { target }
            | Self::Full { target }
            | Self::All { target }
            | Self::Stealth { target } => target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
