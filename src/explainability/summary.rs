//! Per-feature statistics over an attribution set

use super::attribution::AttributionSet;
use serde::{Deserialize, Serialize};

/// Summary of SHAP values across many instances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapSummary {
    /// Feature names
    pub feature_names: Vec<String>,
    /// Mean absolute SHAP values per feature
    pub mean_abs_shap: Vec<f64>,
    /// Mean SHAP values per feature
    pub mean_shap: Vec<f64>,
    /// Standard deviation of SHAP values per feature
    pub std_shap: Vec<f64>,
    /// Min SHAP values per feature
    pub min_shap: Vec<f64>,
    /// Max SHAP values per feature
    pub max_shap: Vec<f64>,
}

impl ShapSummary {
    pub fn from_attributions(set: &AttributionSet) -> Self {
        let columns = set.values.columns();
        let n = set.n_rows().max(1) as f64;

        let mut summary = Self {
            feature_names: set.feature_names.clone(),
            mean_abs_shap: Vec::with_capacity(set.n_features()),
            mean_shap: Vec::with_capacity(set.n_features()),
            std_shap: Vec::with_capacity(set.n_features()),
            min_shap: Vec::with_capacity(set.n_features()),
            max_shap: Vec::with_capacity(set.n_features()),
        };

        for column in columns {
            let mean = column.sum() / n;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            summary.mean_abs_shap.push(column.iter().map(|v| v.abs()).sum::<f64>() / n);
            summary.mean_shap.push(mean);
            summary.std_shap.push(var.sqrt());
            summary.min_shap.push(column.iter().copied().fold(f64::INFINITY, f64::min));
            summary.max_shap.push(column.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        }

        summary
    }

    /// Feature indices by mean absolute SHAP, most influential first.
    /// Equal scores keep feature order.
    pub fn feature_ranking(&self) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.mean_abs_shap.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        indexed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_shap_summary() {
        let set = AttributionSet {
            feature_names: vec!["x0".into(), "x1".into()],
            base_value: 0.0,
            predictions: array![1.0, 1.0],
            values: array![[0.5, 0.5], [1.5, -0.5]],
            data: array![[1.0, 2.0], [3.0, 4.0]],
        };

        let summary = ShapSummary::from_attributions(&set);
        assert_eq!(summary.mean_abs_shap, vec![1.0, 0.5]);
        assert_eq!(summary.mean_shap, vec![1.0, 0.0]);
        assert_eq!(summary.std_shap, vec![0.5, 0.5]);
        assert_eq!(summary.min_shap, vec![0.5, -0.5]);
        assert_eq!(summary.max_shap, vec![1.5, 0.5]);
        assert_eq!(summary.feature_ranking()[0].0, 0);
    }
}
