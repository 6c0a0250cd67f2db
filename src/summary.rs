//! Whole-table summaries shown above each chart group.

use polars::prelude::*;

use crate::error::NotApplicable;
use crate::schema::{color, particulate, temperature};
use crate::stats;
use crate::table::metric_values;

#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSummary {
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub avg_temperature: f64,
    pub temperature_range: f64,
    pub above_40_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PmSummary {
    /// Mean of every `PM*` column, in table order.
    pub means: Vec<(String, f64)>,
    pub max_pm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorSummary {
    pub avg_red: f64,
    pub avg_green: f64,
    pub avg_blue: f64,
    /// Population variance of the three channel means.
    pub color_variance: f64,
}

pub fn temperature_summary(df: &DataFrame) -> Result<TemperatureSummary, NotApplicable> {
    let max = present(df, temperature::MAX)?;
    let min = present(df, temperature::MIN)?;
    let mean = present(df, temperature::MEAN)?;
    let above = present(df, temperature::PIXELS_ABOVE_40)?;

    let (_, max_temperature) = range_of(temperature::MAX, &max)?;
    let (min_temperature, _) = range_of(temperature::MIN, &min)?;

    Ok(TemperatureSummary {
        max_temperature,
        min_temperature,
        avg_temperature: mean_of(temperature::MEAN, &mean)?,
        temperature_range: max_temperature - min_temperature,
        above_40_percent: mean_of(temperature::PIXELS_ABOVE_40, &above)?,
    })
}

pub fn pm_summary(df: &DataFrame) -> Result<PmSummary, NotApplicable> {
    let pm_columns: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .filter(|c| c.starts_with(particulate::PREFIX))
        .map(|c| c.to_string())
        .collect();
    if pm_columns.is_empty() {
        return Err(NotApplicable::MissingColumn(particulate::PREFIX.to_string()));
    }

    let mut means = Vec::with_capacity(pm_columns.len());
    let mut max_pm = f64::NEG_INFINITY;
    for name in pm_columns {
        let values = present(df, &name)?;
        let (_, hi) = range_of(&name, &values)?;
        max_pm = max_pm.max(hi);
        means.push((name.clone(), mean_of(&name, &values)?));
    }

    Ok(PmSummary { means, max_pm })
}

pub fn color_summary(df: &DataFrame) -> Result<ColorSummary, NotApplicable> {
    let [red, green, blue] = color::RGB;
    let avg_red = mean_of(red, &present(df, red)?)?;
    let avg_green = mean_of(green, &present(df, green)?)?;
    let avg_blue = mean_of(blue, &present(df, blue)?)?;

    let color_variance = stats::population_variance(&[avg_red, avg_green, avg_blue]).unwrap_or(0.0);

    Ok(ColorSummary {
        avg_red,
        avg_green,
        avg_blue,
        color_variance,
    })
}

fn present(df: &DataFrame, metric: &str) -> Result<Vec<f64>, NotApplicable> {
    metric_values(df, metric)
        .map(|v| v.into_iter().flatten().collect())
        .ok_or_else(|| NotApplicable::MissingColumn(metric.to_string()))
}

fn mean_of(metric: &str, values: &[f64]) -> Result<f64, NotApplicable> {
    stats::mean(values).ok_or_else(|| NotApplicable::NoNumericValues(metric.to_string()))
}

fn range_of(metric: &str, values: &[f64]) -> Result<(f64, f64), NotApplicable> {
    stats::min_max(values).ok_or_else(|| NotApplicable::NoNumericValues(metric.to_string()))
}
