//! Formatted scan report for the terminal. Read-only over the result; the
//! engine itself never prints.

use colored::*;
use console::Term;

use sweepr_common::network::host::{HostRecord, ScanResult};
use sweepr_common::network::range::HostAddrs;

pub fn report(result: &ScanResult) {
    let term = Term::stdout();
    let width = term.size().1 as usize;

    header("scan report", width);

    if result.hosts.is_empty() {
        println!("{}", "no hosts discovered".yellow());
        summary(result, width);
        return;
    }

    for host in &result.hosts {
        print_host(host);
        println!();
    }

    summary(result, width);
}

fn header(title: &str, width: usize) {
    let line = "=".repeat(width.clamp(20, 80));
    println!("{line}");
    println!("{}", title.to_uppercase().bold());
    println!("{line}");
}

fn print_host(host: &HostRecord) {
    let addr = host.addr.to_string().green().bold();
    match &host.hostname {
        Some(name) => println!("{addr}  ({name})"),
        None => println!("{addr}"),
    }

    if let Some(rtt) = host.rtt {
        println!("    rtt: {:.1}ms", rtt.as_secs_f64() * 1000.0);
    }
    if let Some(mac) = &host.mac {
        match &host.vendor {
            Some(vendor) => println!("    mac: {mac} ({vendor})"),
            None => println!("    mac: {mac}"),
        }
    }
    println!("    os:  {}", host.device.cyan());

    if host.open_ports.is_empty() {
        println!("    {}", "alive, no open ports in scanned range".dimmed());
        return;
    }

    let ports: Vec<String> = host
        .open_ports
        .iter()
        .map(|port| match host.services.get(port) {
            Some(service) => format!("{port}/{service}"),
            None => port.to_string(),
        })
        .collect();
    println!(
        "    open ({}): {}",
        host.open_ports.len(),
        ports.join(", ").bold()
    );
}

fn summary(result: &ScanResult, width: usize) {
    let line = "-".repeat(width.clamp(20, 80));
    println!("{line}");

    if result.partial {
        println!(
            "{}",
            "scan cancelled; results cover completed hosts only".yellow().bold()
        );
    }
    if result.fallback_ping {
        println!(
            "{}",
            "liveness ran on TCP fallback (no ICMP); accuracy may be reduced".dimmed()
        );
    }

    let hosts = format!("{} hosts", result.hosts.len()).green().bold();
    let ports = format!("{} open ports", result.total_open_ports()).bold();
    let elapsed = format!("{:.2}s", result.duration().as_secs_f64()).yellow();
    match scan_rate(result) {
        Some(rate) => println!(
            "{} profile on {}: {hosts}, {ports} in {elapsed} ({rate:.0} addrs/s)",
            result.profile, result.target
        ),
        None => println!(
            "{} profile on {}: {hosts}, {ports} in {elapsed}",
            result.profile, result.target
        ),
    }
}

/// Average probe throughput over the whole scan, in candidate addresses
/// per second. Absent when the duration rounds to zero.
fn scan_rate(result: &ScanResult) -> Option<f64> {
    let range: HostAddrs = result.target.parse().ok()?;
    let secs = result.duration().as_secs_f64();
    if secs > 0.0 {
        Some(range.len() as f64 / secs)
    } else {
        None
    }
}
