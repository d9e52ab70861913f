//! Stderr logging shaped for long scans: every line carries the time since
//! startup, so a run reads as a timeline next to the spinner on stdout.
//! Debug and trace lines also name their source module for `RUST_LOG`
//! filtering.

use std::time::Instant;

use colored::Colorize;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

pub struct ScanClockFormatter {
    started: Instant,
}

impl ScanClockFormatter {
    fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

fn glyph(level: Level) -> &'static str {
    match level {
        Level::TRACE => "..",
        Level::DEBUG => "::",
        Level::INFO => ">>",
        Level::WARN => "!!",
        Level::ERROR => "xx",
    }
}

impl<S, N> FormatEvent<S, N> for ScanClockFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = *meta.level();

        let clock = format!("{:8.2}s", self.started.elapsed().as_secs_f64());
        write!(writer, "{} ", clock.dimmed())?;

        let tag = match level {
            Level::TRACE => glyph(level).dimmed(),
            Level::DEBUG => glyph(level).blue(),
            Level::INFO => glyph(level).green(),
            Level::WARN => glyph(level).yellow().bold(),
            Level::ERROR => glyph(level).red().bold(),
        };
        write!(writer, "{tag} ")?;

        // Verbose levels carry their module path; info and above stay bare.
        if level >= Level::DEBUG {
            write!(writer, "{} ", format!("[{}]", meta.target()).dimmed())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ScanClockFormatter::new())
        .with_writer(std::io::stderr)
        .init();
}
