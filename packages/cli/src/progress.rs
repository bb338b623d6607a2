//! Logger setup and the request spinner.
//!
//! Log output goes through `indicatif-log-bridge` so that `log::info!` and
//! friends are suspended while the spinner redraws.

use std::future::Future;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] that spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

/// Runs `future` with a spinner showing `message`, clearing it afterwards.
pub async fn with_spinner<T>(
    multi: &MultiProgress,
    message: &str,
    future: impl Future<Output = T>,
) -> T {
    let bar = multi.add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());

    let output = future.await;

    bar.finish_and_clear();
    multi.remove(&bar);
    output
}
