//! Tracing subscriber setup.
//!
//! The filter comes from `PORTPILOT_LOG`, then `RUST_LOG`, then `warn`. While
//! the TUI owns the terminal, log lines go to a file in the temp directory.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PORTPILOT_LOG";

/// Log file used in TUI mode.
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("portpilot.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(tui: bool) {
    let filter = env_filter();

    if tui {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path());
        let layer = fmt::layer().with_ansi(false).with_target(false);
        // Never write to the terminal underneath the UI.
        let _ = match file {
            Ok(file) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_writer(Mutex::new(file)))
                .try_init(),
            Err(_) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_writer(std::io::sink))
                .try_init(),
        };
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
