use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info, warn};
use polars::prelude::DataFrame;
use reqwest::blocking::Client;

use crate::cache::TableCache;
use crate::config::DashboardConfig;
use crate::error::MonitorError;
use crate::normalize::normalize_columns;
use crate::table::{assign_sample_ids, fill_missing_with_zero, parse_csv, read_csv_file};

// ── Source addressing ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSource {
    Remote(String),
    Local(PathBuf),
}

impl SampleSource {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Remote(trimmed.to_string())
        } else {
            Self::Local(PathBuf::from(trimmed))
        }
    }

    /// Undecorated address; this is the cache key.
    pub fn address(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::Local(path) => path.display().to_string(),
        }
    }

    /// Address actually requested. Remote sources get a `t=<now_secs>`
    /// parameter when `cache_bust` is set so intermediaries cannot serve
    /// a stale copy.
    pub fn fetch_address(&self, cache_bust: bool, now_secs: i64) -> String {
        match self {
            Self::Remote(url) if cache_bust => {
                let sep = if url.contains('?') { '&' } else { '?' };
                format!("{url}{sep}t={now_secs}")
            }
            _ => self.address(),
        }
    }
}

// ── Load outcome ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOrigin {
    /// Freshly read from the configured source.
    Source,
    /// Served from the time-bounded cache.
    Cache,
    /// Source failed; demo mode supplied the bundled file.
    Fallback,
    /// Nothing could be read.
    Empty,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: DataFrame,
    pub origin: TableOrigin,
    /// One entry per failed read, in the order they happened.
    pub warnings: Vec<String>,
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }
}

// ── Loader ──────────────────────────────────────────────────────────────────

/// Fetches the sample table for one rendering pass.
///
/// `load` never fails: read errors become warnings on the outcome and the
/// table degrades to the demo fallback or an empty frame.
pub struct DataLoader {
    client: Client,
    cache: TableCache,
}

impl DataLoader {
    pub fn new(config: &DashboardConfig) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .user_agent(concat!("coffee-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            cache: TableCache::new(config.source.cache_ttl()),
        })
    }

    pub fn load(&mut self, config: &DashboardConfig) -> LoadOutcome {
        let source = SampleSource::parse(&config.source.location);
        let key = source.address();
        let now = Instant::now();

        self.cache.set_ttl(config.source.cache_ttl());
        if let Some(table) = self.cache.get(&key, now) {
            debug!("serving {} rows for {key} from cache", table.height());
            return LoadOutcome {
                table,
                origin: TableOrigin::Cache,
                warnings: Vec::new(),
            };
        }

        let mut warnings = Vec::new();

        match self
            .fetch(&source, config)
            .and_then(|df| prepare(df, config))
        {
            Ok(table) => {
                info!(
                    "loaded {} samples x {} columns from {key}",
                    table.height(),
                    table.width()
                );
                self.cache.insert(key, table.clone(), now);
                return LoadOutcome {
                    table,
                    origin: TableOrigin::Source,
                    warnings,
                };
            }
            Err(err) => {
                let msg = format!("Could not load samples from {key}: {err}");
                warn!("{msg}");
                warnings.push(msg);
            }
        }

        if config.demo_mode {
            let fallback = &config.source.fallback_path;
            match read_csv_file(fallback).and_then(|df| prepare(df, config)) {
                Ok(table) => {
                    info!(
                        "demo mode: loaded {} samples from {}",
                        table.height(),
                        fallback.display()
                    );
                    return LoadOutcome {
                        table,
                        origin: TableOrigin::Fallback,
                        warnings,
                    };
                }
                Err(err) => {
                    let msg = format!(
                        "Could not load demo samples from {}: {err}",
                        fallback.display()
                    );
                    warn!("{msg}");
                    warnings.push(msg);
                }
            }
        }

        LoadOutcome {
            table: DataFrame::empty(),
            origin: TableOrigin::Empty,
            warnings,
        }
    }

    /// Drop every cached table so the next `load` refetches.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn fetch(&self, source: &SampleSource, config: &DashboardConfig) -> Result<DataFrame, MonitorError> {
        match source {
            SampleSource::Remote(_) => {
                let address =
                    source.fetch_address(config.source.cache_bust, chrono::Utc::now().timestamp());
                debug!("fetching {address}");
                let response = self
                    .client
                    .get(&address)
                    .timeout(config.source.timeout())
                    .send()?
                    .error_for_status()?;
                let body = response.bytes()?;
                parse_csv(body.to_vec())
            }
            SampleSource::Local(path) => {
                debug!("reading {}", path.display());
                read_csv_file(path)
            }
        }
    }
}

/// Index, rename and optionally null-fill a freshly read frame.
fn prepare(df: DataFrame, config: &DashboardConfig) -> Result<DataFrame, MonitorError> {
    let df = assign_sample_ids(df)?;
    let df = normalize_columns(&df);
    if config.fill_missing {
        fill_missing_with_zero(&df)
    } else {
        Ok(df)
    }
}
