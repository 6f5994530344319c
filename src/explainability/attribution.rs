//! Attribution results: one row of Shapley values per explained instance

use crate::error::{ExplainerError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Feature contribution to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    /// Feature index
    pub feature_index: usize,
    /// Feature name
    pub feature_name: String,
    /// Feature value for this instance
    pub feature_value: f64,
    /// Contribution to prediction (SHAP value)
    pub contribution: f64,
}

/// Local explanation for a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalExplanation {
    /// Instance index
    pub instance_index: usize,
    /// Base value (expected prediction over the background)
    pub base_value: f64,
    /// Actual prediction
    pub prediction: f64,
    /// Feature contributions, in feature order
    pub contributions: Vec<FeatureContribution>,
}

impl LocalExplanation {
    /// Get sum of contributions
    pub fn sum_contributions(&self) -> f64 {
        self.contributions.iter().map(|c| c.contribution).sum()
    }

    /// Get sorted contributions (by absolute value, descending)
    pub fn sorted_contributions(&self) -> Vec<&FeatureContribution> {
        let mut sorted: Vec<&FeatureContribution> = self.contributions.iter().collect();
        sorted.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// Get top k contributors
    pub fn top_k_contributors(&self, k: usize) -> Vec<&FeatureContribution> {
        self.sorted_contributions().into_iter().take(k).collect()
    }
}

/// Shapley values for a batch of instances.
///
/// `values[[i, j]]` is the contribution of feature `j` to prediction `i`;
/// `data` holds the explained feature values with the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionSet {
    pub feature_names: Vec<String>,
    pub base_value: f64,
    pub predictions: Array1<f64>,
    pub values: Array2<f64>,
    pub data: Array2<f64>,
}

impl AttributionSet {
    /// Number of explained instances
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    /// Explanation of one instance, by position
    pub fn explanation(&self, row: usize) -> Result<LocalExplanation> {
        if row >= self.n_rows() {
            return Err(ExplainerError::InvalidSelection {
                index: row,
                rows: self.n_rows(),
            });
        }

        let contributions = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(j, name)| FeatureContribution {
                feature_index: j,
                feature_name: name.clone(),
                feature_value: self.data[[row, j]],
                contribution: self.values[[row, j]],
            })
            .collect();

        Ok(LocalExplanation {
            instance_index: row,
            base_value: self.base_value,
            prediction: self.predictions[row],
            contributions,
        })
    }

    /// All explanations, in row order
    pub fn explanations(&self) -> Vec<LocalExplanation> {
        (0..self.n_rows())
            .filter_map(|row| self.explanation(row).ok())
            .collect()
    }

    /// Largest gap between `base + Σ contributions` and the prediction
    pub fn max_additivity_error(&self) -> f64 {
        self.values
            .rows()
            .into_iter()
            .zip(self.predictions.iter())
            .map(|(row, &p)| (self.base_value + row.sum() - p).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_set() -> AttributionSet {
        AttributionSet {
            feature_names: vec!["a".into(), "b".into(), "c".into()],
            base_value: 0.0,
            predictions: array![6.0, 1.0],
            values: array![[1.0, -3.0, 8.0], [0.5, 0.5, 0.0]],
            data: array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
        }
    }

    #[test]
    fn test_explanation_row() {
        let set = sample_set();
        let exp = set.explanation(1).unwrap();
        assert_eq!(exp.instance_index, 1);
        assert_eq!(exp.prediction, 1.0);
        assert_eq!(exp.contributions[2].feature_value, 6.0);
        assert_eq!(exp.sum_contributions(), 1.0);
    }

    #[test]
    fn test_explanation_out_of_range() {
        let err = sample_set().explanation(2).unwrap_err();
        assert!(matches!(err, ExplainerError::InvalidSelection { index: 2, rows: 2 }));
    }

    #[test]
    fn test_sorted_contributions() {
        let exp = sample_set().explanation(0).unwrap();
        let sorted = exp.sorted_contributions();
        assert_eq!(sorted[0].feature_name, "c");
        assert_eq!(sorted[1].feature_name, "b");
        assert_eq!(sorted[2].feature_name, "a");
        assert_eq!(exp.top_k_contributors(1).len(), 1);
    }

    #[test]
    fn test_additivity_error() {
        assert_eq!(sample_set().max_additivity_error(), 0.0);
        assert_eq!(sample_set().explanations().len(), 2);
    }
}
