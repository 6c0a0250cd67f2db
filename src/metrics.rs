//! Derived statistics over a loaded sample table.
//!
//! Every function here is read-only over the frame it is given and is
//! recomputed on each call. Shape problems (too few rows, missing metric,
//! constant column) are reported through [`NotApplicable`] or handled
//! numerically, never as panics.

use polars::prelude::*;

use crate::error::NotApplicable;
use crate::schema::MetricCategory;
use crate::stats;
use crate::table::{metric_values, numeric_metrics};

// ── Latest sample ───────────────────────────────────────────────────────────

/// The last row in Sample ID order, as a one-row frame.
pub fn latest_snapshot(df: &DataFrame) -> Result<DataFrame, NotApplicable> {
    if df.height() == 0 {
        return Err(NotApplicable::EmptyTable);
    }
    Ok(df.slice(-1, 1))
}

pub fn latest_value(df: &DataFrame, metric: &str) -> Result<f64, NotApplicable> {
    let values = column_values(df, metric)?;
    match values.last() {
        None => Err(NotApplicable::EmptyTable),
        Some(None) => Err(NotApplicable::NoNumericValues(metric.to_string())),
        Some(Some(v)) => Ok(*v),
    }
}

/// Latest value minus the mean of every earlier sample.
pub fn latest_delta(df: &DataFrame, metric: &str) -> Result<f64, NotApplicable> {
    let values = column_values(df, metric)?;
    require_rows(values.len(), 2)?;

    let (latest, history) = split_latest(metric, &values)?;
    let history: Vec<f64> = history.iter().flatten().copied().collect();
    let baseline =
        stats::mean(&history).ok_or_else(|| NotApplicable::NoNumericValues(metric.to_string()))?;
    Ok(latest - baseline)
}

/// Share of samples (latest included) strictly below the latest value, 0-100.
///
/// Ties never count, so the latest sample can reach at most
/// `100 * (n - 1) / n` and a constant column ranks 0.
pub fn percentile_rank(df: &DataFrame, metric: &str) -> Result<f64, NotApplicable> {
    let values = column_values(df, metric)?;
    require_rows(values.len(), 2)?;

    let (latest, _) = split_latest(metric, &values)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let below = present.iter().filter(|v| **v < latest).count();
    Ok(below as f64 / present.len() as f64 * 100.0)
}

// ── Metric cards ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub metric: String,
    pub latest: f64,
    pub delta: Option<f64>,
    pub percentile: Option<f64>,
}

/// Latest value, delta and percentile for each requested metric that has a
/// latest value. Metrics absent from the table are skipped.
pub fn metric_report(df: &DataFrame, metrics: &[String]) -> Vec<MetricReport> {
    metrics
        .iter()
        .filter_map(|m| {
            let latest = latest_value(df, m).ok()?;
            Some(MetricReport {
                metric: m.clone(),
                latest,
                delta: latest_delta(df, m).ok(),
                percentile: percentile_rank(df, m).ok(),
            })
        })
        .collect()
}

// ── Min-max normalization ───────────────────────────────────────────────────

/// Every row of `metric` rescaled to [0, 1] by the column's min and max.
pub fn normalized_column(df: &DataFrame, metric: &str) -> Result<Vec<Option<f64>>, NotApplicable> {
    let values = column_values(df, metric)?;
    let (min, max) = column_range(metric, &values)?;
    Ok(values
        .iter()
        .map(|v| v.map(|x| stats::scale(x, min, max)))
        .collect())
}

/// One row's values for `metrics`, each rescaled against its own column.
/// Missing metrics and null cells are left out.
pub fn normalize_row(
    df: &DataFrame,
    metrics: &[String],
    row: usize,
) -> Result<Vec<(String, f64)>, NotApplicable> {
    if df.height() == 0 {
        return Err(NotApplicable::EmptyTable);
    }
    if row >= df.height() {
        return Err(NotApplicable::TooFewRows {
            required: row + 1,
            found: df.height(),
        });
    }

    let mut out = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let Some(values) = metric_values(df, metric) else {
            continue;
        };
        let Some(value) = values[row] else {
            continue;
        };
        if let Ok((min, max)) = column_range(metric, &values) {
            out.push((metric.clone(), stats::scale(value, min, max)));
        }
    }
    Ok(out)
}

/// Latest sample against the mean of all earlier ones, both on the 0-1 scale.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarComparison {
    pub metrics: Vec<String>,
    pub latest: Vec<f64>,
    pub history_mean: Vec<f64>,
}

pub fn radar_comparison(df: &DataFrame, metrics: &[String]) -> Result<RadarComparison, NotApplicable> {
    require_rows(df.height(), 2)?;

    let mut radar = RadarComparison {
        metrics: Vec::new(),
        latest: Vec::new(),
        history_mean: Vec::new(),
    };

    for metric in metrics {
        let Some(values) = metric_values(df, metric) else {
            continue;
        };
        let Ok((latest, history)) = split_latest(metric, &values) else {
            continue;
        };
        let history: Vec<f64> = history.iter().flatten().copied().collect();
        let Some(history_mean) = stats::mean(&history) else {
            continue;
        };
        let Ok((min, max)) = column_range(metric, &values) else {
            continue;
        };

        radar.metrics.push(metric.clone());
        radar.latest.push(stats::scale(latest, min, max));
        radar.history_mean.push(stats::scale(history_mean, min, max));
    }

    if radar.metrics.is_empty() {
        return Err(NotApplicable::TooFewMetrics {
            required: 1,
            found: 0,
        });
    }
    Ok(radar)
}

// ── Correlation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub metrics: Vec<String>,
    /// Row-major, `values[i][j]` pairs `metrics[i]` with `metrics[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.metrics.iter().position(|m| m == a)?;
        let j = self.metrics.iter().position(|m| m == b)?;
        Some(self.values[i][j])
    }

    /// A `metric` label column followed by one column per metric.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.metrics.len() + 1);
        let labels: Vec<&str> = self.metrics.iter().map(|m| m.as_str()).collect();
        columns.push(Series::new("metric".into(), labels).into());
        for (j, metric) in self.metrics.iter().enumerate() {
            let col: Vec<f64> = self.values.iter().map(|row| row[j]).collect();
            columns.push(Series::new(metric.as_str().into(), col).into());
        }
        DataFrame::new(columns)
    }
}

/// Pairwise Pearson correlation for the selected metrics present in `df`.
/// Columns without a single numeric value are left out of the selection.
pub fn correlation_matrix(df: &DataFrame, metrics: &[String]) -> Result<CorrelationMatrix, NotApplicable> {
    let selected: Vec<(String, Vec<Option<f64>>)> = metrics
        .iter()
        .filter_map(|m| metric_values(df, m).map(|v| (m.clone(), v)))
        .filter(|(_, v)| v.iter().any(Option::is_some))
        .collect();

    if selected.len() < 2 {
        return Err(NotApplicable::TooFewMetrics {
            required: 2,
            found: selected.len(),
        });
    }

    let n = selected.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = stats::pearson(&selected[i].1, &selected[j].1);
            // a column with variance correlates exactly 1 with itself
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        metrics: selected.into_iter().map(|(m, _)| m).collect(),
        values,
    })
}

// ── Selection helpers ───────────────────────────────────────────────────────

/// Numeric metric columns that fall under `category`.
pub fn category_metrics(df: &DataFrame, category: &MetricCategory) -> Vec<String> {
    numeric_metrics(df)
        .into_iter()
        .filter(|m| category.matches(m))
        .collect()
}

/// Every category paired with its matching columns; empty categories included.
pub fn categorize(
    df: &DataFrame,
    categories: &[MetricCategory],
) -> Vec<(&'static str, Vec<String>)> {
    categories
        .iter()
        .map(|c| (c.name, category_metrics(df, c)))
        .collect()
}

/// The caller's selection, or every numeric metric when it is empty.
pub fn resolve_selection(df: &DataFrame, selected: &[String]) -> Vec<String> {
    if selected.is_empty() {
        numeric_metrics(df)
    } else {
        selected.to_vec()
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

fn column_values(df: &DataFrame, metric: &str) -> Result<Vec<Option<f64>>, NotApplicable> {
    metric_values(df, metric).ok_or_else(|| NotApplicable::MissingColumn(metric.to_string()))
}

fn require_rows(found: usize, required: usize) -> Result<(), NotApplicable> {
    match found {
        0 => Err(NotApplicable::EmptyTable),
        n if n < required => Err(NotApplicable::TooFewRows { required, found }),
        _ => Ok(()),
    }
}

fn split_latest<'a>(
    metric: &str,
    values: &'a [Option<f64>],
) -> Result<(f64, &'a [Option<f64>]), NotApplicable> {
    match values.split_last() {
        Some((Some(latest), history)) => Ok((*latest, history)),
        Some((None, _)) => Err(NotApplicable::NoNumericValues(metric.to_string())),
        None => Err(NotApplicable::EmptyTable),
    }
}

fn column_range(metric: &str, values: &[Option<f64>]) -> Result<(f64, f64), NotApplicable> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    stats::min_max(&present).ok_or_else(|| NotApplicable::NoNumericValues(metric.to_string()))
}
