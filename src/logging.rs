//! Logging initialization.
//!
//! Console output with `tracing-subscriber`'s `EnvFilter` (`RUST_LOG`,
//! default `info`); an optional rolling file appender when a log
//! directory is configured. No scheduler or desktop app-data-dir
//! resolution lives here — this is a library, not the headless binary
//! that embeds it.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes console logging with `RUST_LOG`-controlled level
/// filtering. Call once at process start.
pub fn init_console_logging() {
    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_thread_ids(false).with_file(true).with_line_number(true));

    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
}

/// Initializes logging to a daily-rotating file under `log_dir`, with no
/// console output and no ANSI color codes.
pub fn init_file_logging(log_dir: &Path, file_prefix: &str) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(file_appender).with_target(true).with_thread_ids(false).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
    Ok(())
}
