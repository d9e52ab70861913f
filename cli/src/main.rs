mod commands;
mod export;
mod terminal;

use std::time::Duration;

use tracing::{info, warn};

use commands::CommandLine;
use sweepr_common::config::ScanConfig;
use sweepr_common::network::range::HostAddrs;
use sweepr_core::{ScanEngine, ScanEvent};
use terminal::{print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();
    terminal::logging::init();

    let range: HostAddrs = cli.command.target().parse()?;
    let config = build_config(&cli);

    let engine = ScanEngine::new(config);
    if engine.fallback_mode() {
        warn!("ICMP echo unavailable; falling back to TCP liveness probes");
    }

    // Ctrl-C cancels the scan but keeps everything completed so far.
    let cancel = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing with partial results");
            cancel.cancel();
        }
    });

    let progress = spinner::start(&format!("scanning {range}..."));
    let engine = engine.on_progress({
        let progress = progress.clone();
        move |event| match event {
            ScanEvent::HostDiscovered { addr, rtt } => {
                progress.set_message(format!(
                    "{addr} alive ({:.1}ms)",
                    rtt.as_secs_f64() * 1000.0
                ));
            }
            ScanEvent::HostScanned { addr, open_ports } => {
                progress.set_message(format!("{addr} scanned, {open_ports} open"));
            }
        }
    });

    let result = engine.run(range).await;
    progress.finish_and_clear();

    print::report(&result);

    if let Some(format) = cli.export {
        let path = export::write(&result, format)?;
        info!("results exported to {}", path.display());
    }

    Ok(())
}

fn build_config(cli: &CommandLine) -> ScanConfig {
    let mut config = ScanConfig::for_profile(cli.command.profile());

    if let Some(limit) = cli.host_concurrency {
        config = config.with_host_concurrency(limit);
    }
    if let Some(limit) = cli.port_concurrency {
        config = config.with_port_concurrency(limit);
    }
    if let Some(ms) = cli.port_timeout_ms {
        config = config.with_port_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = cli.probe_delay_ms {
        config = config.with_probe_delay(Some(Duration::from_millis(ms)));
    }

    config
}
