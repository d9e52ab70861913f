use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Steady-tick spinner that carries the latest progress message while a
/// scan runs. Clones share the same bar, so the progress callback can keep
/// one and the main task another.
pub fn start(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .expect("spinner template is static and valid");
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
