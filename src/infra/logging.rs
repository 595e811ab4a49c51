// ============================================================
// Layer 6 — Logging Setup
// ============================================================
// A test run logs to two places:
//   - the console, filtered by RUST_LOG (default: info for
//     this crate)
//   - logs/Test-<timestamp>.log, same events without colours,
//     so a finished run leaves a permanent record
//
// A freeze run only logs to the console.
//
// Reference: tracing-subscriber documentation

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// RUST_LOG, plus info for this crate unless RUST_LOG says otherwise.
fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive("sann_eval=info".parse()?))
}

/// Install a console-only global subscriber.
pub fn init_console() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(fmt::layer())
        .try_init()
        .context("A global tracing subscriber is already installed")
}

/// Install the global subscriber with a log file. Returns the
/// log file path.
pub fn init(log_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let log_dir = log_dir.as_ref();
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Cannot create log directory '{}'", log_dir.display()))?;

    let path = log_dir.join(log_file_name(chrono::Local::now()));
    let file = File::create(&path)
        .with_context(|| format!("Cannot create log file '{}'", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(path)
}

fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("Test-{}.log", now.format("%Y%m%d-%H%M%S"))
}
