//! Result export: JSON via serde, CSV written line by line. The export layer
//! only reads the finished [`ScanResult`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;

use sweepr_common::network::host::ScanResult;

use crate::commands::ExportFormat;

/// Writes the result to `sweepr_<timestamp>.<ext>` in the working
/// directory and returns the path.
pub fn write(result: &ScanResult, format: ExportFormat) -> anyhow::Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = match format {
        ExportFormat::Json => PathBuf::from(format!("sweepr_{stamp}.json")),
        ExportFormat::Csv => PathBuf::from(format!("sweepr_{stamp}.csv")),
    };

    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, result).context("serializing scan result")?;
        }
        ExportFormat::Csv => write_csv(&mut out, result).context("writing csv")?,
    }

    out.flush()?;
    Ok(path)
}

fn write_csv(out: &mut impl Write, result: &ScanResult) -> std::io::Result<()> {
    writeln!(out, "ip,hostname,mac,vendor,os,open_ports,services")?;

    for host in &result.hosts {
        let ports = host
            .open_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(";");
        let services = host
            .services
            .iter()
            .map(|(port, service)| format!("{port}:{service}"))
            .collect::<Vec<_>>()
            .join(";");

        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            host.addr,
            host.hostname.as_deref().unwrap_or_default(),
            host.mac.as_deref().unwrap_or_default(),
            host.vendor.as_deref().unwrap_or_default(),
            host.device,
            ports,
            services,
        )?;
    }
    Ok(())
}
