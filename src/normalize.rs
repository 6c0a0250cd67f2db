use log::warn;
use polars::prelude::*;

use crate::schema::legacy;

/// Rename legacy color columns to their canonical names.
///
/// Returns a new frame; the input is left untouched. Columns outside the
/// legacy mapping pass through. If a canonical column already exists the
/// legacy one is kept as-is, so applying this twice is a no-op.
pub fn normalize_columns(df: &DataFrame) -> DataFrame {
    let mut out = df.clone();
    let schema = df.schema();

    for (old, new) in legacy::RENAMES {
        if !schema.contains(old) || schema.contains(new) {
            continue;
        }
        if let Err(err) = out.rename(old, new.into()) {
            warn!("could not rename column '{old}' to '{new}': {err}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::color;

    fn legacy_frame() -> DataFrame {
        df!(
            "mean_H" => [0.1, 0.2],
            "dom_R" => [120.0, 121.0],
            "PM2.5" => [3.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn renames_legacy_columns() {
        let df = legacy_frame();
        let out = normalize_columns(&df);

        let names = out.get_column_names_str();
        assert_eq!(names, vec![color::MEAN_H, color::MEAN_RED, "PM2.5"]);
        // original untouched
        assert!(df.column("dom_R").is_ok());
    }

    #[test]
    fn idempotent() {
        let once = normalize_columns(&legacy_frame());
        let twice = normalize_columns(&once);
        assert!(once.equals_missing(&twice));
        assert_eq!(once.get_column_names_str(), twice.get_column_names_str());
    }

    #[test]
    fn canonical_column_wins_over_legacy() {
        let df = df!(
            "dom_G" => [1.0],
            "Mean_Green" => [2.0],
        )
        .unwrap();
        let out = normalize_columns(&df);
        assert_eq!(out.get_column_names_str(), vec!["dom_G", "Mean_Green"]);
    }

    #[test]
    fn empty_frame_passes_through() {
        let out = normalize_columns(&DataFrame::empty());
        assert_eq!(out.width(), 0);
    }
}
