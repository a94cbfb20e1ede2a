use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Environment variable naming the log file. The terminal UI owns stdout, so
/// logs are only written when this is set.
pub const LOG_ENV: &str = "PROCTOR_LOG";

pub fn init() -> Result<()> {
    let Ok(path) = std::env::var(LOG_ENV) else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}
