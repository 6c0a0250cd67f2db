use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Where samples come from and how eagerly they are refetched.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// `http(s)://` URL or a local CSV path.
    pub location: String,
    /// Bundled CSV used in demo mode when the source cannot be read.
    pub fallback_path: PathBuf,
    /// Append a `t=<unix seconds>` query parameter to remote addresses.
    pub cache_bust: bool,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

/// Everything the host decides per rendering pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub demo_mode: bool,
    /// Advisory only; the host's timer owns the actual re-run.
    pub refresh_interval_secs: u64,
    /// Metric subset for correlation and radar charts. Empty selects all.
    pub selected_metrics: Vec<String>,
    /// Replace nulls in numeric columns with 0 after loading.
    pub fill_missing: bool,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|v| v.parse::<u64>().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    env_string(key).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: env_string("COFFEE_MONITOR_SOURCE")
                .unwrap_or_else(|| "data/coffee_samples.csv".to_string()),
            fallback_path: env_string("COFFEE_MONITOR_FALLBACK")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/demo_samples.csv")),
            cache_bust: true,
            cache_ttl_secs: env_u64("COFFEE_MONITOR_CACHE_TTL").unwrap_or(15),
            timeout_secs: env_u64("COFFEE_MONITOR_TIMEOUT").unwrap_or(10),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            demo_mode: env_flag("COFFEE_MONITOR_DEMO").unwrap_or(false),
            refresh_interval_secs: env_u64("COFFEE_MONITOR_REFRESH").unwrap_or(30),
            selected_metrics: Vec::new(),
            fill_missing: false,
        }
    }
}

impl SourceConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl DashboardConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, MonitorError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, MonitorError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
