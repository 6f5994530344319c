//! Tabular datasets: the built-in diabetes table and CSV files

use crate::error::{ExplainerError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Rows in the built-in diabetes table
pub const DIABETES_ROWS: usize = 442;

const DIABETES_FEATURES: [&str; 10] = [
    "age", "sex", "bmi", "bp", "s1", "s2", "s3", "s4", "s5", "s6",
];

/// Fixed generator seed for the built-in table; the table never changes.
const DIABETES_GENERATOR_SEED: u64 = 0x0D1A_BE7E;

/// Mean of four uniforms: a cheap bell curve on [0, 1).
fn bell(rng: &mut ChaCha8Rng) -> f64 {
    (0..4).map(|_| rng.gen::<f64>()).sum::<f64>() / 4.0
}

/// Where a dataset comes from. Also the cache key for memoized loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetSource {
    /// Built-in diabetes-style regression table
    Diabetes,
    /// CSV file with a header row and a named numeric target column
    Csv { path: PathBuf, target: String },
}

impl DatasetSource {
    /// Read the dataset. Pure: the same source always yields the same table.
    pub fn load(&self) -> Result<Dataset> {
        match self {
            DatasetSource::Diabetes => Ok(Dataset::diabetes()),
            DatasetSource::Csv { path, target } => Dataset::from_csv(path, target),
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Diabetes => write!(f, "diabetes (built-in)"),
            DatasetSource::Csv { path, target } => {
                write!(f, "{} (target `{}`)", path.display(), target)
            }
        }
    }
}

/// Summary statistics for one column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn from_values(name: &str, values: impl Iterator<Item = f64> + Clone) -> Self {
        let n = values.clone().count().max(1) as f64;
        let mean = values.clone().sum::<f64>() / n;
        let var = values.clone().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.clone().fold(f64::INFINITY, f64::min);
        let max = values.fold(f64::NEG_INFINITY, f64::max);
        Self {
            name: name.to_string(),
            mean,
            std: var.sqrt(),
            min,
            max,
        }
    }
}

/// Immutable numeric table: `k` feature columns plus one target column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    name: String,
    feature_names: Vec<String>,
    target_name: String,
    features: Array2<f64>,
    target: Array1<f64>,
}

impl Dataset {
    /// Build a dataset, checking that names and shapes agree
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        target_name: impl Into<String>,
        features: Array2<f64>,
        target: Array1<f64>,
    ) -> Result<Self> {
        if features.ncols() != feature_names.len() {
            return Err(ExplainerError::ShapeError {
                expected: format!("{} feature columns", feature_names.len()),
                actual: format!("{} columns", features.ncols()),
            });
        }
        if features.nrows() != target.len() {
            return Err(ExplainerError::ShapeError {
                expected: format!("target length = {}", features.nrows()),
                actual: format!("target length = {}", target.len()),
            });
        }
        if feature_names.is_empty() {
            return Err(ExplainerError::DataUnavailable(
                "dataset has no feature columns".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            feature_names,
            target_name: target_name.into(),
            features,
            target,
        })
    }

    /// The built-in diabetes-style table: 442 patients, ten baseline variables
    /// (age, sex, body mass index, blood pressure, six serum measurements) and a
    /// disease progression score one year later.
    ///
    /// Features are mean-centred and scaled to unit L2 norm per column. The
    /// table is generated from a fixed seed, so it is identical on every call.
    pub fn diabetes() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(DIABETES_GENERATOR_SEED);
        let n = DIABETES_ROWS;
        let k = DIABETES_FEATURES.len();

        let mut raw = Array2::<f64>::zeros((n, k));
        for i in 0..n {
            let age = 19.0 + 60.0 * bell(&mut rng);
            let sex = if rng.gen_bool(0.47) { 2.0 } else { 1.0 };
            let bmi = 18.0 + 24.0 * bell(&mut rng) + 0.04 * (age - 48.0);
            let bp = 62.0 + 71.0 * bell(&mut rng) + 0.3 * (age - 48.0);
            let tc = 97.0 + 204.0 * bell(&mut rng);
            let ldl = 0.62 * tc - 5.0 + 40.0 * (bell(&mut rng) - 0.5);
            let hdl = 22.0 + 77.0 * bell(&mut rng) - 2.0 * (sex - 1.5);
            let tch = tc / hdl;
            let ltg = 3.2 + 2.9 * bell(&mut rng) + 0.01 * (bmi - 26.0);
            let glu = 58.0 + 66.0 * bell(&mut rng) + 0.2 * (bmi - 26.0);
            let row = [age, sex, bmi, bp, tc, ldl, hdl, tch, ltg, glu];
            for (j, v) in row.iter().enumerate() {
                raw[[i, j]] = *v;
            }
        }

        let mut features = raw;
        for mut column in features.axis_iter_mut(Axis(1)) {
            let mean = column.mean().unwrap_or(0.0);
            column.mapv_inplace(|v| v - mean);
            let norm = column.dot(&column).sqrt();
            if norm > 0.0 {
                column.mapv_inplace(|v| v / norm);
            }
        }

        let target: Array1<f64> = features
            .rows()
            .into_iter()
            .map(|x| {
                let (sex, bmi, bp) = (x[1], x[2], x[3]);
                let (s1, s2, s3, s5, s6) = (x[4], x[5], x[6], x[8], x[9]);
                let linear = 152.0 + 950.0 * bmi + 420.0 * bp + 720.0 * s5 - 240.0 * sex
                    - 350.0 * s3 + 180.0 * (s1 - s2) + 70.0 * s6;
                let interaction = 9000.0 * bmi * s5;
                let noise = 54.0 * (rng.gen::<f64>() + rng.gen::<f64>() - 1.0);
                (linear + interaction + noise).clamp(25.0, 346.0).round()
            })
            .collect();

        Self {
            name: "diabetes".to_string(),
            feature_names: DIABETES_FEATURES.iter().map(|s| s.to_string()).collect(),
            target_name: "target".to_string(),
            features,
            target,
        }
    }

    /// Load a CSV file with a header row. Every column other than `target` is a feature.
    pub fn from_csv(path: impl AsRef<Path>, target: &str) -> Result<Self> {
        let path = path.as_ref();
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| ExplainerError::DataUnavailable(format!("{}: {}", path.display(), e)))?
            .finish()
            .map_err(|e| ExplainerError::DataUnavailable(format!("{}: {}", path.display(), e)))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv")
            .to_string();
        let mut dataset = Self::from_dataframe(&df, target)?;
        dataset.name = name;
        Ok(dataset)
    }

    /// Convert a polars frame. Columns must be numeric (or castable) and complete.
    pub fn from_dataframe(df: &DataFrame, target: &str) -> Result<Self> {
        let column_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        if !column_names.iter().any(|c| c == target) {
            return Err(ExplainerError::DataUnavailable(format!(
                "target column `{}` not found",
                target
            )));
        }

        let feature_names: Vec<String> = column_names
            .iter()
            .filter(|name| name.as_str() != target)
            .cloned()
            .collect();

        let target_values = Self::numeric_column(df, target)?;
        let col_data: Vec<Vec<f64>> = feature_names
            .iter()
            .map(|name| Self::numeric_column(df, name))
            .collect::<Result<Vec<_>>>()?;

        let n_rows = df.height();
        let features = Array2::from_shape_fn((n_rows, feature_names.len()), |(r, c)| col_data[c][r]);

        Self::new(
            "dataframe",
            feature_names,
            target,
            features,
            Array1::from_vec(target_values),
        )
    }

    fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let column = df
            .column(name)?
            .cast(&DataType::Float64)
            .map_err(|e| ExplainerError::DataUnavailable(format!("column `{}`: {}", name, e)))?;
        let values = column.as_materialized_series().f64()?;

        if values.null_count() > 0 {
            return Err(ExplainerError::DataUnavailable(format!(
                "column `{}` has {} missing or non-numeric values",
                name,
                values.null_count()
            )));
        }

        Ok(values.into_iter().flatten().collect())
    }

    /// Dataset label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    /// Copy out the given rows (features and target), in the given order
    pub fn select_rows(&self, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
        let x = self.features.select(Axis(0), indices);
        let y = self.target.select(Axis(0), indices);
        (x, y)
    }

    /// Per-column summary statistics, features first, target last
    pub fn describe(&self) -> Vec<ColumnSummary> {
        let mut summaries: Vec<ColumnSummary> = self
            .feature_names
            .iter()
            .zip(self.features.columns())
            .map(|(name, column)| ColumnSummary::from_values(name, column.iter().copied()))
            .collect();
        summaries.push(ColumnSummary::from_values(
            &self.target_name,
            self.target.iter().copied(),
        ));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diabetes_shape() {
        let ds = Dataset::diabetes();
        assert_eq!(ds.n_rows(), DIABETES_ROWS);
        assert_eq!(ds.n_features(), 10);
        assert_eq!(ds.feature_names()[2], "bmi");
        assert_eq!(ds.target_name(), "target");
    }

    #[test]
    fn test_diabetes_is_stable() {
        assert_eq!(Dataset::diabetes(), Dataset::diabetes());
    }

    #[test]
    fn test_diabetes_scaling() {
        let ds = Dataset::diabetes();
        for column in ds.features().columns() {
            let mean = column.mean().unwrap();
            let norm = column.dot(&column).sqrt();
            assert!(mean.abs() < 1e-12, "column mean {}", mean);
            assert!((norm - 1.0).abs() < 1e-9, "column norm {}", norm);
        }
        assert!(ds.target().iter().all(|&t| (25.0..=346.0).contains(&t)));
    }

    #[test]
    fn test_from_dataframe() {
        let df = df!(
            "a" => &[1.0, 2.0, 3.0],
            "y" => &[10.0, 20.0, 30.0],
            "b" => &[4i64, 5, 6]
        )
        .unwrap();

        let ds = Dataset::from_dataframe(&df, "y").unwrap();
        assert_eq!(ds.feature_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(ds.features()[[2, 1]], 6.0);
        assert_eq!(ds.target()[1], 20.0);
    }

    #[test]
    fn test_from_dataframe_missing_target() {
        let df = df!("a" => &[1.0, 2.0]).unwrap();
        let err = Dataset::from_dataframe(&df, "y").unwrap_err();
        assert!(matches!(err, ExplainerError::DataUnavailable(_)));
    }

    #[test]
    fn test_from_dataframe_rejects_text() {
        let df = df!(
            "a" => &["x", "y"],
            "y" => &[1.0, 2.0]
        )
        .unwrap();
        let err = Dataset::from_dataframe(&df, "y").unwrap_err();
        assert!(matches!(err, ExplainerError::DataUnavailable(_)));
    }

    #[test]
    fn test_select_rows_and_describe() {
        let ds = Dataset::new(
            "tiny",
            vec!["x".to_string()],
            "y",
            ndarray::array![[1.0], [2.0], [3.0]],
            ndarray::array![2.0, 4.0, 6.0],
        )
        .unwrap();

        let (x, y) = ds.select_rows(&[2, 0]);
        assert_eq!(x[[0, 0]], 3.0);
        assert_eq!(y[1], 2.0);

        let summary = ds.describe();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].mean, 2.0);
        assert_eq!(summary[1].max, 6.0);
    }

    #[test]
    fn test_new_rejects_mismatched_shapes() {
        let err = Dataset::new(
            "bad",
            vec!["x".to_string()],
            "y",
            ndarray::array![[1.0], [2.0]],
            ndarray::array![1.0],
        )
        .unwrap_err();
        assert!(matches!(err, ExplainerError::ShapeError { .. }));
    }
}
