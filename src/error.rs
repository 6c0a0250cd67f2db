#[cfg(feature = "python")]
use pyo3::exceptions::PyRuntimeError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("{0}")]
    General(String),
}

/// Why a derived statistic could not be computed for the current table.
///
/// None of these are failures: the host renders the message in place of
/// the chart or metric card.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotApplicable {
    #[error("No samples loaded yet")]
    EmptyTable,

    #[error("Need at least {required} samples, have {found}")]
    TooFewRows { required: usize, found: usize },

    #[error("Metric '{0}' is not present in the loaded data")]
    MissingColumn(String),

    #[error("Metric '{0}' has no numeric values")]
    NoNumericValues(String),

    #[error("Select at least {required} metrics (found {found})")]
    TooFewMetrics { required: usize, found: usize },
}

#[cfg(feature = "python")]
impl From<MonitorError> for PyErr {
    fn from(err: MonitorError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PyErr> for MonitorError {
    fn from(err: PyErr) -> Self {
        MonitorError::General(err.to_string())
    }
}
