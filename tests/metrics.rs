use coffee_monitor::error::NotApplicable;
use coffee_monitor::metrics::{
    correlation_matrix, latest_delta, metric_report, normalized_column, percentile_rank,
    radar_comparison, resolve_selection,
};
use coffee_monitor::parse_csv;
use coffee_monitor::schema::temperature;
use coffee_monitor::table::assign_sample_ids;
use polars::prelude::*;

fn load(csv: &str) -> DataFrame {
    assign_sample_ids(parse_csv(csv.as_bytes().to_vec()).unwrap()).unwrap()
}

#[test]
fn temperature_scenario() {
    let df = load("Max Temperature (°C)\n10\n20\n30\n");

    assert_eq!(latest_delta(&df, temperature::MAX), Ok(15.0));
    let rank = percentile_rank(&df, temperature::MAX).unwrap();
    assert!((rank - 66.666_666_7).abs() < 1e-6);
}

#[test]
fn strict_maximum_ranks_n_minus_one_over_n() {
    let df = load("PM2.5\n3\n1\n4\n1\n5\n9\n");
    let n = df.height() as f64;
    let rank = percentile_rank(&df, "PM2.5").unwrap();
    assert!((rank - 100.0 * (n - 1.0) / n).abs() < 1e-9);
}

#[test]
fn single_sample_has_no_delta_or_rank() {
    let df = load("PM10\n7\n");
    assert!(latest_delta(&df, "PM10").is_err());
    assert!(percentile_rank(&df, "PM10").is_err());
    assert_eq!(
        latest_delta(&df, "PM10").unwrap_err().to_string(),
        "Need at least 2 samples, have 1"
    );

    let cards = metric_report(&df, &["PM10".to_string()]);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].latest, 7.0);
    assert_eq!(cards[0].delta, None);
    assert_eq!(cards[0].percentile, None);
}

#[test]
fn rank_and_normalization_stay_in_bounds() {
    let df = load("a,b\n-5,100\n3,100\n12,100\n0,100\n");
    for metric in ["a", "b"] {
        let rank = percentile_rank(&df, metric).unwrap();
        assert!((0.0..=100.0).contains(&rank));
        for v in normalized_column(&df, metric).unwrap().into_iter().flatten() {
            assert!((0.0..=1.0).contains(&v));
        }
    }
    // constant column
    assert_eq!(normalized_column(&df, "b").unwrap(), vec![Some(0.0); 4]);
}

#[test]
fn empty_table_is_not_applicable_everywhere() {
    let df = DataFrame::empty();
    assert_eq!(
        latest_delta(&df, "PM10"),
        Err(NotApplicable::MissingColumn("PM10".into()))
    );
    assert!(radar_comparison(&df, &["PM10".into()]).is_err());
    assert!(correlation_matrix(&df, &[]).is_err());
}

#[test]
fn default_selection_covers_numeric_metrics() {
    let df = load("Mean_Red,Mean_Green,Label\n10,20,x\n20,10,y\n30,35,z\n");
    let selection = resolve_selection(&df, &[]);
    assert_eq!(selection, vec!["Mean_Red", "Mean_Green"]);

    let corr = correlation_matrix(&df, &selection).unwrap();
    assert_eq!(corr.metrics, selection);
    assert_eq!(corr.get("Mean_Red", "Mean_Red"), Some(1.0));
    assert_eq!(
        corr.get("Mean_Red", "Mean_Green"),
        corr.get("Mean_Green", "Mean_Red")
    );

    let radar = radar_comparison(&df, &selection).unwrap();
    assert_eq!(radar.latest, vec![1.0, 1.0]);
}
