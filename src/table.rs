use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;

use crate::error::MonitorError;
use crate::schema::sample::SAMPLE_ID;

// ── CSV in ──────────────────────────────────────────────────────────────────

/// Parse CSV content (header row, comma-delimited, UTF-8) into a frame.
/// Column names are trimmed of surrounding whitespace. Every row is scanned
/// for type inference, so a fractional value late in an integer column
/// widens the column instead of failing the parse.
pub fn parse_csv(bytes: Vec<u8>) -> Result<DataFrame, MonitorError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    trim_column_names(df)
}

/// Read a CSV file from disk.
pub fn read_csv_file(path: &Path) -> Result<DataFrame, MonitorError> {
    if !path.is_file() {
        return Err(MonitorError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        )));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    trim_column_names(df)
}

fn trim_column_names(mut df: DataFrame) -> Result<DataFrame, MonitorError> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;
    Ok(df)
}

// ── CSV out ─────────────────────────────────────────────────────────────────

/// Serialize a table to CSV bytes (header included) for download.
pub fn export_csv(df: &DataFrame) -> Result<Vec<u8>, MonitorError> {
    let mut buf = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    Ok(buf)
}

// ── Sample index ────────────────────────────────────────────────────────────

/// Prepend a dense 1-based `Sample ID` column, replacing any existing one.
pub fn assign_sample_ids(df: DataFrame) -> Result<DataFrame, MonitorError> {
    let mut df = if df.column(SAMPLE_ID).is_ok() {
        df.drop(SAMPLE_ID)?
    } else {
        df
    };
    let ids: Vec<i64> = (1..=df.height() as i64).collect();
    df.insert_column(0, Series::new(SAMPLE_ID.into(), ids))?;
    Ok(df)
}

/// Replace nulls in every numeric column with 0.
pub fn fill_missing_with_zero(df: &DataFrame) -> Result<DataFrame, MonitorError> {
    let columns = df
        .get_columns()
        .iter()
        .map(|c| -> PolarsResult<Column> {
            if c.dtype().is_primitive_numeric() && c.null_count() > 0 {
                let filled = c
                    .as_materialized_series()
                    .fill_null(FillNullStrategy::Zero)?;
                Ok(filled.into())
            } else {
                Ok(c.clone())
            }
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    Ok(DataFrame::new(columns)?)
}

// ── Numeric access ──────────────────────────────────────────────────────────

/// Metric column as floats, one entry per row. `None` if the column is
/// absent; cells that are not numbers come back as `None`.
pub fn metric_values(df: &DataFrame, metric: &str) -> Option<Vec<Option<f64>>> {
    let column = df.column(metric).ok()?;
    let cast = column.cast(&DataType::Float64).ok()?;
    let values = cast.f64().ok()?;
    Some(values.into_iter().collect())
}

/// Names of numeric columns other than `Sample ID`, in table order.
pub fn numeric_metrics(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_primitive_numeric() && c.name().as_str() != SAMPLE_ID)
        .map(|c| c.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_header() {
        let csv = b" Max Temperature (\xc2\xb0C) ,PM2.5\n10,1.5\n20,2.5\n".to_vec();
        let df = parse_csv(csv).unwrap();
        assert_eq!(
            df.get_column_names_str(),
            vec!["Max Temperature (°C)", "PM2.5"]
        );
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn type_inference_scans_every_row() {
        let mut csv = String::from("PM2.5\n");
        for i in 0..150 {
            csv.push_str(&format!("{}\n", i % 7));
        }
        csv.push_str("3.5\n");

        let df = parse_csv(csv.into_bytes()).unwrap();
        assert_eq!(df.height(), 151);
        assert_eq!(df.column("PM2.5").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn sample_ids_replace_source_index() {
        let df = df!(
            SAMPLE_ID => [7i64, 3, 9],
            "PM10" => [1.0, 2.0, 3.0],
        )
        .unwrap();
        let df = assign_sample_ids(df).unwrap();
        assert_eq!(df.get_column_names_str()[0], SAMPLE_ID);
        let ids: Vec<Option<i64>> = df.column(SAMPLE_ID).unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn metric_values_casts_integers_and_skips_text() {
        let df = df!(
            "Weight" => [10i64, 12],
            "Label" => ["a", "b"],
        )
        .unwrap();
        assert_eq!(metric_values(&df, "Weight"), Some(vec![Some(10.0), Some(12.0)]));
        assert_eq!(metric_values(&df, "Label"), Some(vec![None, None]));
        assert_eq!(metric_values(&df, "Missing"), None);
        assert_eq!(numeric_metrics(&df), vec!["Weight".to_string()]);
    }

    #[test]
    fn fill_missing_only_touches_numeric_nulls() {
        let df = df!(
            "PM1.0" => [Some(1.0), None],
            "Label" => [Some("x"), None],
        )
        .unwrap();
        let filled = fill_missing_with_zero(&df).unwrap();
        assert_eq!(metric_values(&filled, "PM1.0"), Some(vec![Some(1.0), Some(0.0)]));
        assert_eq!(filled.column("Label").unwrap().null_count(), 1);
    }

    #[test]
    fn export_round_trips() {
        let df = df!(
            SAMPLE_ID => [1i64, 2],
            "Mean Temperature (°C)" => [21.5, 22.25],
            "PM10" => [4i64, 5],
        )
        .unwrap();
        let bytes = export_csv(&df).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Sample ID,Mean Temperature (°C),PM10\n"));

        let back = parse_csv(bytes).unwrap();
        assert!(df.equals_missing(&back));
    }
}
