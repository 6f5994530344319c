//! Model explainability module
//!
//! Shapley-value attributions for any prediction function:
//! - [`shap`] - exact and permutation explainers
//! - [`attribution`] - per-instance results
//! - [`summary`] - per-feature statistics used to order plots

pub mod attribution;
pub mod shap;
pub mod summary;

pub use attribution::{AttributionSet, FeatureContribution, LocalExplanation};
pub use shap::{Algorithm, Explainer, EXACT_FEATURE_LIMIT};
pub use summary::ShapSummary;
