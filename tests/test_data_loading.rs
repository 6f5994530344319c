//! Integration tests for dataset loading: built-in table, CSV files and polars frames

use forest_explainer::config::SessionConfig;
use forest_explainer::data::{Dataset, DatasetCache, DatasetSource, DIABETES_ROWS};
use forest_explainer::error::{ErrorKind, ExplainerError};
use forest_explainer::explainability::Algorithm;
use forest_explainer::session::run_pipeline;
use polars::prelude::*;
use std::io::Write;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
    tmp.write_all(contents.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn linear_csv(rows: usize) -> String {
    let mut csv = String::from("x1,x2,x3,y\n");
    for i in 0..rows {
        let x1 = i as f64 * 0.5;
        let x2 = (i % 7) as f64;
        let x3 = ((i * 13) % 11) as f64 - 5.0;
        csv.push_str(&format!("{},{},{},{}\n", x1, x2, x3, 2.0 * x1 - x2 + 0.5 * x3));
    }
    csv
}

fn csv_source(tmp: &tempfile::NamedTempFile, target: &str) -> DatasetSource {
    DatasetSource::Csv {
        path: tmp.path().to_path_buf(),
        target: target.to_string(),
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig::default().with_n_estimators(10)
}

// ============================================================================
// Built-in dataset
// ============================================================================

#[test]
fn test_builtin_dataset_is_stable() {
    let a = Dataset::diabetes();
    let b = Dataset::diabetes();
    assert_eq!(a.n_rows(), DIABETES_ROWS);
    assert_eq!(a.n_features(), 10);
    assert_eq!(a.features(), b.features());
    assert_eq!(a.target(), b.target());
}

#[test]
fn test_describe_covers_features_and_target() {
    let ds = Dataset::diabetes();
    let summary = ds.describe();
    assert_eq!(summary.len(), 11);
    assert_eq!(summary[0].name, "age");
    assert_eq!(summary[10].name, "target");
    assert!(summary.iter().all(|s| s.min <= s.mean && s.mean <= s.max));
}

// ============================================================================
// CSV datasets
// ============================================================================

#[test]
fn test_csv_dataset_runs_end_to_end() {
    let tmp = write_csv(&linear_csv(60));
    let source = csv_source(&tmp, "y");

    let out = run_pipeline(&DatasetCache::new(), &source, "4", &fast_config()).unwrap();
    assert_eq!(out.table.n_rows(), 5);
    assert_eq!(out.table.column_names(), vec!["photo", "prediction", "x1", "x2", "x3"]);
    assert_eq!(out.attributions.n_features(), 3);
    assert!(out.attributions.max_additivity_error() < 1e-6);
}

#[test]
fn test_csv_load_is_memoized() {
    let tmp = write_csv(&linear_csv(20));
    let source = csv_source(&tmp, "y");
    let cache = DatasetCache::new();

    let first = cache.load(&source).unwrap();
    let second = cache.load(&source).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.target_name(), "y");
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_csv_with_fewer_rows_than_sample() {
    let tmp = write_csv(&linear_csv(4));
    let err = run_pipeline(&DatasetCache::new(), &csv_source(&tmp, "y"), "1", &fast_config())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataUnavailable);
}

#[test]
fn test_csv_missing_target() {
    let tmp = write_csv(&linear_csv(10));
    let err = Dataset::from_csv(tmp.path(), "label").unwrap_err();
    assert!(matches!(err, ExplainerError::DataUnavailable(_)));
}

#[test]
fn test_csv_missing_file() {
    let source = DatasetSource::Csv {
        path: "/nonexistent/forest.csv".into(),
        target: "y".to_string(),
    };
    let err = run_pipeline(&DatasetCache::new(), &source, "1", &fast_config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataUnavailable);
}

#[test]
fn test_csv_non_numeric_column() {
    let tmp = write_csv("x,name,y\n1,a,2\n2,b,3\n3,c,4\n4,d,5\n5,e,6\n6,f,7\n");
    let err = Dataset::from_csv(tmp.path(), "y").unwrap_err();
    assert!(matches!(err, ExplainerError::DataUnavailable(_)));
}

#[test]
fn test_feature_named_like_prediction_column() {
    let mut csv = String::from("prediction,x,y\n");
    for i in 0..10 {
        csv.push_str(&format!("{},{},{}\n", i, i * 2, i * 3));
    }
    let tmp = write_csv(&csv);
    let err = run_pipeline(&DatasetCache::new(), &csv_source(&tmp, "y"), "1", &fast_config())
        .unwrap_err();
    assert!(matches!(err, ExplainerError::ConfigurationError(_)));
}

fn wide_csv(rows: usize, features: usize) -> String {
    let header: Vec<String> = (0..features).map(|j| format!("f{}", j)).collect();
    let mut csv = format!("{},y\n", header.join(","));
    for i in 0..rows {
        let values: Vec<f64> = (0..features).map(|j| ((i * (j + 3)) % 17) as f64).collect();
        let y: f64 = values.iter().enumerate().map(|(j, v)| v * (j % 4) as f64).sum();
        let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        csv.push_str(&format!("{},{}\n", cells.join(","), y));
    }
    csv
}

#[test]
fn test_csv_with_more_than_64_features() {
    let tmp = write_csv(&wide_csv(40, 70));
    let config = SessionConfig::default().with_n_estimators(3);

    let out = run_pipeline(&DatasetCache::new(), &csv_source(&tmp, "y"), "1", &config).unwrap();
    assert_eq!(out.attributions.n_features(), 70);
    assert_eq!(out.attributions.n_rows(), 5);
    assert!(out.attributions.max_additivity_error() < 1e-6);
}

#[test]
fn test_exact_over_limit_is_configuration_error() {
    let tmp = write_csv(&wide_csv(30, 20));
    let config = fast_config().with_algorithm(Algorithm::Exact);

    let err = run_pipeline(&DatasetCache::new(), &csv_source(&tmp, "y"), "1", &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(err, ExplainerError::ConfigurationError(_)));
}

// ============================================================================
// Polars frames
// ============================================================================

#[test]
fn test_from_dataframe() {
    let df = df!(
        "a" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        "b" => &[1i64, 0, 1, 0, 1, 0],
        "target" => &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]
    )
    .unwrap();

    let ds = Dataset::from_dataframe(&df, "target").unwrap();
    assert_eq!(ds.n_rows(), 6);
    assert_eq!(ds.feature_names(), &["a".to_string(), "b".to_string()]);
    assert_eq!(ds.features()[[2, 1]], 1.0);
    assert_eq!(ds.target()[5], 60.0);
}

#[test]
fn test_from_dataframe_with_nulls() {
    let df = df!(
        "a" => &[Some(1.0), None, Some(3.0)],
        "target" => &[1.0, 2.0, 3.0]
    )
    .unwrap();

    let err = Dataset::from_dataframe(&df, "target").unwrap_err();
    assert!(matches!(err, ExplainerError::DataUnavailable(_)));
}
