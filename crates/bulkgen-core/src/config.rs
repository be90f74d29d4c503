use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poller::PollIntervals;
use crate::retry::RetryPolicy;

/// Fixed credential pair sent as HTTP Basic auth on every request.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

/// Progress polling intervals (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay between status fetches while a job is active.
    pub interval_ms: u64,
    /// Delay after a failed status fetch before trying again.
    pub error_backoff_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            error_backoff_ms: 10000,
        }
    }
}

/// Retry policy parameters for brainstorm requests (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds before the retry.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_secs: 2.0,
            max_delay_secs: 10,
        }
    }
}

/// Transport timeouts (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Whole-request timeout; brainstorm calls run an LLM server-side and are slow.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 120,
        }
    }
}

/// Global configuration loaded from `~/.config/bulkgen/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkgenConfig {
    /// Backend API root, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Page size used by `jobs` listings (capped at 100).
    #[serde(default = "default_page_size")]
    pub list_page_size: u32,
    pub credentials: Credentials,
    #[serde(default)]
    pub poll: Option<PollConfig>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

/// Floor for poll delays.
const MIN_POLL_INTERVAL_MS: u64 = 100;
/// Upper bound for any configured delay.
const MAX_DELAY_SECS: u64 = 3600;

fn default_page_size() -> u32 {
    50
}

impl Default for BulkgenConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            list_page_size: default_page_size(),
            credentials: Credentials::default(),
            poll: None,
            retry: None,
            http: None,
        }
    }
}

impl BulkgenConfig {
    pub fn poll_intervals(&self) -> PollIntervals {
        let poll = self.poll.clone().unwrap_or_default();
        let bounded = |ms: u64| {
            Duration::from_millis(ms.clamp(MIN_POLL_INTERVAL_MS, MAX_DELAY_SECS * 1000))
        };
        PollIntervals {
            interval: bounded(poll.interval_ms),
            error_backoff: bounded(poll.error_backoff_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.clone().unwrap_or_default();
        let max_delay = Duration::from_secs(retry.max_delay_secs.min(MAX_DELAY_SECS));
        // NaN and negative delays mean no wait; infinity caps at max_delay.
        let base_secs = if retry.base_delay_secs.is_nan() {
            0.0
        } else {
            retry.base_delay_secs.clamp(0.0, max_delay.as_secs_f64())
        };
        RetryPolicy {
            max_attempts: retry.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(base_secs),
            max_delay,
        }
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    /// Apply `BULKGEN_BASE_URL`, `BULKGEN_USERNAME` and `BULKGEN_PASSWORD` overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("BULKGEN_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = v;
        }
        if let Some(v) = lookup("BULKGEN_USERNAME") {
            self.credentials.username = v;
        }
        if let Some(v) = lookup("BULKGEN_PASSWORD") {
            self.credentials.password = v;
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkgen")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BulkgenConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like `load_or_init` but for an explicit path (the CLI's `--config`).
pub fn load_or_init_at(path: &Path) -> Result<BulkgenConfig> {
    if !path.exists() {
        let default_cfg = BulkgenConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(path)
}

/// Load configuration from an existing file.
pub fn load_from_path(path: &Path) -> Result<BulkgenConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: BulkgenConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
