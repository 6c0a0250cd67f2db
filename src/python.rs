use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::config::DashboardConfig;
use crate::error::MonitorError;
use crate::loader::{DataLoader, TableOrigin};
use crate::metrics;
use crate::normalize;
use crate::schema::*;
use crate::table;

/// One dashboard session: configuration, loader cache and the warnings of
/// the most recent load.
#[pyclass(name = "Dashboard")]
pub struct PyDashboard {
    config: DashboardConfig,
    loader: DataLoader,
    warnings: Vec<String>,
    origin: Option<TableOrigin>,
}

#[pymethods]
impl PyDashboard {
    #[new]
    #[pyo3(signature = (config_path=None, demo_mode=None))]
    fn new(config_path: Option<&str>, demo_mode: Option<bool>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => DashboardConfig::from_file(Path::new(path))?,
            None => DashboardConfig::default(),
        };
        if let Some(demo) = demo_mode {
            config.demo_mode = demo;
        }
        let loader = DataLoader::new(&config)?;
        Ok(Self {
            config,
            loader,
            warnings: Vec::new(),
            origin: None,
        })
    }

    // ── Loading ─────────────────────────────────────────────────────────────

    /// Load the current sample table. Never raises; check `warnings`.
    fn load(&mut self) -> PyDataFrame {
        let outcome = self.loader.load(&self.config);
        self.warnings = outcome.warnings;
        self.origin = Some(outcome.origin);
        PyDataFrame(outcome.table)
    }

    fn clear_cache(&mut self) {
        self.loader.clear_cache();
    }

    // ── Properties ──────────────────────────────────────────────────────────

    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }

    /// "source", "cache", "fallback", "empty", or None before the first load.
    #[getter]
    fn origin(&self) -> Option<&'static str> {
        self.origin.map(|o| match o {
            TableOrigin::Source => "source",
            TableOrigin::Cache => "cache",
            TableOrigin::Fallback => "fallback",
            TableOrigin::Empty => "empty",
        })
    }

    #[getter]
    fn demo_mode(&self) -> bool {
        self.config.demo_mode
    }

    #[setter]
    fn set_demo_mode(&mut self, value: bool) {
        self.config.demo_mode = value;
    }

    #[getter]
    fn refresh_interval_secs(&self) -> u64 {
        self.config.refresh_interval().as_secs()
    }

    #[getter]
    fn selected_metrics(&self) -> Vec<String> {
        self.config.selected_metrics.clone()
    }

    #[setter]
    fn set_selected_metrics(&mut self, metrics: Vec<String>) {
        self.config.selected_metrics = metrics;
    }

    // ── Metrics ─────────────────────────────────────────────────────────────

    #[staticmethod]
    fn latest_delta(df: PyDataFrame, metric: &str) -> Option<f64> {
        metrics::latest_delta(&df.0, metric).ok()
    }

    #[staticmethod]
    fn percentile_rank(df: PyDataFrame, metric: &str) -> Option<f64> {
        metrics::percentile_rank(&df.0, metric).ok()
    }

    /// List of (metric, latest, delta, percentile) tuples.
    #[pyo3(signature = (df, metrics=None))]
    fn metric_report(
        &self,
        df: PyDataFrame,
        metrics: Option<Vec<String>>,
    ) -> Vec<(String, f64, Option<f64>, Option<f64>)> {
        let selection = self.selection(&df.0, metrics);
        metrics::metric_report(&df.0, &selection)
            .into_iter()
            .map(|r| (r.metric, r.latest, r.delta, r.percentile))
            .collect()
    }

    #[pyo3(signature = (df, metrics=None))]
    fn correlation_matrix(
        &self,
        df: PyDataFrame,
        metrics: Option<Vec<String>>,
    ) -> PyResult<Option<PyDataFrame>> {
        let selection = self.selection(&df.0, metrics);
        match metrics::correlation_matrix(&df.0, &selection) {
            Ok(corr) => {
                let frame = corr.to_dataframe().map_err(MonitorError::from)?;
                Ok(Some(PyDataFrame(frame)))
            }
            Err(_) => Ok(None),
        }
    }

    /// (metrics, latest, history_mean) on the 0-1 scale, or None.
    #[pyo3(signature = (df, metrics=None))]
    fn radar_comparison(
        &self,
        df: PyDataFrame,
        metrics: Option<Vec<String>>,
    ) -> Option<(Vec<String>, Vec<f64>, Vec<f64>)> {
        let selection = self.selection(&df.0, metrics);
        metrics::radar_comparison(&df.0, &selection)
            .ok()
            .map(|r| (r.metrics, r.latest, r.history_mean))
    }

    /// Why the latest delta of `metric` cannot be computed, or None if it can.
    #[staticmethod]
    fn delta_unavailable_reason(df: PyDataFrame, metric: &str) -> Option<String> {
        metrics::latest_delta(&df.0, metric)
            .err()
            .map(|e| e.to_string())
    }

    // ── Table utilities ─────────────────────────────────────────────────────

    #[staticmethod]
    fn normalize_columns(df: PyDataFrame) -> PyDataFrame {
        PyDataFrame(normalize::normalize_columns(&df.0))
    }

    #[staticmethod]
    fn export_csv(df: PyDataFrame) -> PyResult<String> {
        let bytes = table::export_csv(&df.0)?;
        String::from_utf8(bytes)
            .map_err(|e| MonitorError::InvalidData(e.to_string()).into())
    }
}

impl PyDashboard {
    fn selection(&self, df: &polars::prelude::DataFrame, metrics: Option<Vec<String>>) -> Vec<String> {
        let requested = metrics.unwrap_or_else(|| self.config.selected_metrics.clone());
        metrics::resolve_selection(df, &requested)
    }
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Sample
    let sample_mod = PyModule::new(m.py(), "sample")?;
    sample_mod.add("SAMPLE_ID", sample::SAMPLE_ID)?;
    m.add_submodule(&sample_mod)?;

    // Temperature
    let temperature_mod = PyModule::new(m.py(), "temperature")?;
    temperature_mod.add("MAX", temperature::MAX)?;
    temperature_mod.add("MIN", temperature::MIN)?;
    temperature_mod.add("MEAN", temperature::MEAN)?;
    temperature_mod.add("PIXELS_ABOVE_40", temperature::PIXELS_ABOVE_40)?;
    m.add_submodule(&temperature_mod)?;

    // Particulate matter
    let particulate_mod = PyModule::new(m.py(), "particulate")?;
    particulate_mod.add("PM1_0", particulate::PM1_0)?;
    particulate_mod.add("PM2_5", particulate::PM2_5)?;
    particulate_mod.add("PM10", particulate::PM10)?;
    m.add_submodule(&particulate_mod)?;

    // Color
    let color_mod = PyModule::new(m.py(), "color")?;
    color_mod.add("MEAN_RED", color::MEAN_RED)?;
    color_mod.add("MEAN_GREEN", color::MEAN_GREEN)?;
    color_mod.add("MEAN_BLUE", color::MEAN_BLUE)?;
    color_mod.add("MEAN_H", color::MEAN_H)?;
    color_mod.add("MEAN_S", color::MEAN_S)?;
    color_mod.add("A_STAR", color::A_STAR)?;
    color_mod.add("B_STAR", color::B_STAR)?;
    m.add_submodule(&color_mod)?;

    // Categories: name -> substring patterns
    let categories: Vec<(&str, Vec<&str>)> = CATEGORIES
        .iter()
        .map(|c| (c.name, c.patterns.to_vec()))
        .collect();
    m.add("CATEGORIES", categories)?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn coffee_monitor(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDashboard>()?;
    add_schema_exports(m)?;
    Ok(())
}
