//! Shapley-value explainer for a black-box prediction function
//!
//! Missing features are filled in from a background set (interventional
//! expectation), so the value of a coalition `S` for instance `x` is the mean
//! prediction over background rows `b` of the hybrid row `(x_S, b_rest)`.
//!
//! Two algorithms:
//! - exact: enumerates all `2^k` coalitions, practical up to about a dozen features
//! - permutation: seeded random permutations, each walked forwards and backwards
//!
//! Both are additive: `base_value + Σ φ_j == f(x)` up to rounding.

use super::attribution::AttributionSet;
use crate::config::ExplainerConfig;
use crate::error::{ExplainerError, Result};
use ndarray::{s, Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard ceiling for exact enumeration
pub const EXACT_FEATURE_LIMIT: usize = 16;

/// Attribution algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Exact for small feature counts, permutation otherwise
    #[default]
    Auto,
    /// Enumerate every coalition
    Exact,
    /// Antithetic permutation sampling
    Permutation,
}

/// Explainer bound to a prediction function and a background set
pub struct Explainer<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>>,
{
    /// Prediction function
    predict_fn: F,
    /// Background dataset for computing expectations
    background: Array2<f64>,
    algorithm: Algorithm,
    /// Evaluation budget for the permutation algorithm
    max_evals: usize,
    /// Feature count up to which `Auto` stays exact
    exact_max_features: usize,
    /// Random seed
    seed: u64,
    /// Feature names
    feature_names: Option<Vec<String>>,
}

impl<F> Explainer<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>>,
{
    /// Create a new explainer. The background must have at least one row.
    pub fn new(predict_fn: F, background: Array2<f64>) -> Result<Self> {
        if background.nrows() == 0 || background.ncols() == 0 {
            return Err(ExplainerError::ModelError(
                "explainer background must have at least one row and one feature".to_string(),
            ));
        }
        let defaults = ExplainerConfig::default();
        Ok(Self {
            predict_fn,
            background,
            algorithm: defaults.algorithm,
            max_evals: defaults.max_evals,
            exact_max_features: defaults.exact_max_features,
            seed: 0,
            feature_names: None,
        })
    }

    /// Apply algorithm and budget settings
    pub fn with_config(mut self, config: &ExplainerConfig) -> Self {
        self.algorithm = config.algorithm;
        self.max_evals = config.max_evals.max(1);
        self.exact_max_features = config.exact_max_features;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the evaluation budget for permutation sampling
    pub fn with_max_evals(mut self, max_evals: usize) -> Self {
        self.max_evals = max_evals.max(1);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set feature names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Algorithm actually used for `n_features` features
    pub fn resolved_algorithm(&self, n_features: usize) -> Algorithm {
        match self.algorithm {
            Algorithm::Auto if n_features <= self.exact_max_features.min(EXACT_FEATURE_LIMIT) => {
                Algorithm::Exact
            }
            Algorithm::Auto => Algorithm::Permutation,
            other => other,
        }
    }

    /// Number of permutations the evaluation budget allows
    pub fn n_permutations(&self, n_features: usize) -> usize {
        (self.max_evals / (2 * n_features + 1)).max(1)
    }

    /// Explain every row of `x`
    pub fn explain(&self, x: &Array2<f64>) -> Result<AttributionSet> {
        let n_features = self.background.ncols();
        if x.ncols() != n_features {
            return Err(ExplainerError::ShapeError {
                expected: format!("{} features", n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let feature_names = match &self.feature_names {
            Some(names) if names.len() == n_features => names.clone(),
            Some(names) => {
                return Err(ExplainerError::ShapeError {
                    expected: format!("{} feature names", n_features),
                    actual: format!("{} feature names", names.len()),
                })
            }
            None => (0..n_features).map(|j| format!("feature_{}", j)).collect(),
        };

        let algorithm = self.resolved_algorithm(n_features);
        if algorithm == Algorithm::Exact && n_features > EXACT_FEATURE_LIMIT {
            return Err(ExplainerError::ConfigurationError(format!(
                "exact explanation of {} features exceeds the limit of {}",
                n_features, EXACT_FEATURE_LIMIT
            )));
        }

        let base_value = self.predict(&self.background)?.mean().unwrap_or(0.0);
        let predictions = self.predict(x)?;

        let mut values = Array2::<f64>::zeros((x.nrows(), n_features));
        for (i, instance) in x.rows().into_iter().enumerate() {
            let phi = match algorithm {
                Algorithm::Permutation => {
                    self.permutation_row(instance, self.seed.wrapping_add(i as u64))?
                }
                _ => self.exact_row(instance)?,
            };
            values.row_mut(i).assign(&Array1::from_vec(phi));
        }

        debug!(
            rows = x.nrows(),
            features = n_features,
            algorithm = ?algorithm,
            base_value,
            "attributions computed"
        );

        Ok(AttributionSet {
            feature_names,
            base_value,
            predictions,
            values,
            data: x.clone(),
        })
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let out = (self.predict_fn)(x)?;
        if out.len() != x.nrows() {
            return Err(ExplainerError::ModelError(format!(
                "prediction function returned {} values for {} rows",
                out.len(),
                x.nrows()
            )));
        }
        Ok(out)
    }

    /// Mean prediction for `n_coalitions` coalitions, evaluated in one batch.
    ///
    /// `present(m, j)` tells whether feature `j` takes the instance value in
    /// coalition `m`; absent features take the background value.
    fn coalition_values<P>(
        &self,
        instance: ArrayView1<f64>,
        n_coalitions: usize,
        present: P,
    ) -> Result<Vec<f64>>
    where
        P: Fn(usize, usize) -> bool,
    {
        let n_bg = self.background.nrows();
        let n_features = instance.len();

        let mut batch = Array2::<f64>::zeros((n_coalitions * n_bg, n_features));
        for m in 0..n_coalitions {
            for (b, bg_row) in self.background.rows().into_iter().enumerate() {
                let mut row = batch.row_mut(m * n_bg + b);
                for j in 0..n_features {
                    row[j] = if present(m, j) { instance[j] } else { bg_row[j] };
                }
            }
        }

        let preds = self.predict(&batch)?;
        Ok((0..n_coalitions)
            .map(|m| preds.slice(s![m * n_bg..(m + 1) * n_bg]).mean().unwrap_or(0.0))
            .collect())
    }

    // Only reached with k <= EXACT_FEATURE_LIMIT, so coalitions fit in a u64 mask.
    fn exact_row(&self, instance: ArrayView1<f64>) -> Result<Vec<f64>> {
        let k = instance.len();
        let masks: Vec<u64> = (0..1u64 << k).collect();
        let values = self.coalition_values(instance, masks.len(), |m, j| masks[m] >> j & 1 == 1)?;

        // Shapley weight |S|! (k - |S| - 1)! / k! = 1 / (k * C(k - 1, |S|))
        let weights: Vec<f64> = (0..k)
            .map(|size| 1.0 / (k as f64 * binomial(k - 1, size)))
            .collect();

        let mut phi = vec![0.0; k];
        for &mask in &masks {
            let size = mask.count_ones() as usize;
            for (j, p) in phi.iter_mut().enumerate() {
                let bit = 1u64 << j;
                if mask & bit == 0 {
                    let with = values[(mask | bit) as usize];
                    let without = values[mask as usize];
                    *p += weights[size] * (with - without);
                }
            }
        }
        Ok(phi)
    }

    fn permutation_row(&self, instance: ArrayView1<f64>, seed: u64) -> Result<Vec<f64>> {
        let k = instance.len();
        let n_perms = self.n_permutations(k);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut phi = vec![0.0; k];

        let mut order: Vec<usize> = (0..k).collect();
        for _ in 0..n_perms {
            order.shuffle(&mut rng);

            for pass in [order.clone(), order.iter().rev().copied().collect::<Vec<_>>()] {
                // Coalition m holds the first m features of the pass.
                let mut position = vec![0usize; k];
                for (step, &j) in pass.iter().enumerate() {
                    position[j] = step;
                }

                let values = self.coalition_values(instance, k + 1, |m, j| position[j] < m)?;
                for (step, &j) in pass.iter().enumerate() {
                    phi[j] += values[step + 1] - values[step];
                }
            }
        }

        let passes = (2 * n_perms) as f64;
        Ok(phi.into_iter().map(|p| p / passes).collect())
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
