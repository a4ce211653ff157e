//! Tracing subscriber configuration for the simulator.
//!
//! Log levels follow these conventions:
//! - ERROR: unusable input (bad address, truncated header, wrong IP version)
//! - WARN: expected drops and skipped work (TTL expired, no route, unknown protocol)
//! - INFO: forwarding decisions and run milestones
//! - DEBUG: header creation, parsing and packet assembly details

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides `level`. With `file` set, output is appended to that
/// file without ANSI colors; otherwise it goes to stderr.
pub fn init(level: &str, file: Option<&Path>) -> std::io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(level));

    match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    tracing::info!("Logger initialized - Log level: {}", level);
    Ok(())
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("debug"))
        .with_test_writer()
        .try_init();
}
