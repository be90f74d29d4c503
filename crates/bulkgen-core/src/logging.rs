//! Logging setup: `tracing` events go to `~/.local/state/bulkgen/bulkgen.log`.
//!
//! The filter comes from `BULKGEN_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
//! The log file is rotated to `bulkgen.log.1` once it passes [`MAX_LOG_BYTES`].
//! Credentials are never logged; URLs pass through [`redact_url`] first.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use url::Url;

pub const LOG_ENV: &str = "BULKGEN_LOG";
pub const DEFAULT_FILTER: &str = "info,bulkgen_core=debug,bulkgen_cli=debug";
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkgen")?;
    Ok(xdg_dirs
        .place_state_file("bulkgen.log")
        .context("creating log directory")?)
}

/// Move `path` aside to `<path>.1` when it is larger than `max_bytes`.
/// Returns whether a rotation happened.
fn rotate_if_large(path: &Path, max_bytes: u64) -> io::Result<bool> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= max_bytes {
        return Ok(false);
    }
    let mut rotated = path.as_os_str().to_owned();
    rotated.push(".1");
    fs::rename(path, rotated)?;
    Ok(true)
}

/// Install the file subscriber. Errors (unwritable state dir, subscriber already
/// set) are returned so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    let rotated = rotate_if_large(&path, MAX_LOG_BYTES)
        .with_context(|| format!("rotating {}", path.display()))?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(rotated, "bulkgen logging to {}", path.display());
    Ok(())
}

pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

/// URL text safe for logs: any `user:password@` part is masked.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if !url.username().is_empty() || url.password().is_some() => {
            let _ = url.set_username("***");
            let _ = url.set_password(None);
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "<unparseable url>".to_string(),
    }
}
