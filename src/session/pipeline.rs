//! One run: seed → sample → forest → predictions → table → attributions
//!
//! Everything is computed before anything is shown, so a failing step never
//! leaves a half-drawn display behind.

use crate::config::SessionConfig;
use crate::data::{parse_seed, DatasetCache, DatasetSource, SampleSplit};
use crate::display::{DisplayTable, GridOptions, GridOptionsBuilder};
use crate::error::Result;
use crate::explainability::{AttributionSet, Explainer, LocalExplanation};
use crate::training::RandomForest;
use ndarray::Array2;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub seed: u64,
    /// Dataset label
    pub dataset: String,
    pub split: SampleSplit,
    pub table: DisplayTable,
    pub grid: GridOptions,
    pub attributions: AttributionSet,
    /// Normalised impurity importances of the fitted forest
    pub feature_importances: Vec<f64>,
}

impl RunOutput {
    /// Predictions for the sample rows, in table order
    pub fn predictions(&self) -> Vec<f64> {
        self.attributions.predictions.to_vec()
    }

    /// Waterfall input for the table row at `row`
    pub fn explanation(&self, row: usize) -> Result<LocalExplanation> {
        self.attributions.explanation(row)
    }
}

/// Run the full pipeline for `seed_text`.
///
/// The seed and configuration are checked before the dataset is touched.
pub fn run_pipeline(
    cache: &DatasetCache,
    source: &DatasetSource,
    seed_text: &str,
    config: &SessionConfig,
) -> Result<RunOutput> {
    let started = Instant::now();
    let seed = parse_seed(seed_text)?;
    config.validate()?;
    info!(seed, source = %source, "run started");

    let step = Instant::now();
    let dataset = cache.load(source)?;
    let split = SampleSplit::draw(dataset.n_rows(), seed)?;
    let (x_train, y_train) = dataset.select_rows(&split.training);
    let (x_sample, _) = dataset.select_rows(&split.sample);
    debug!(
        rows = dataset.n_rows(),
        features = dataset.n_features(),
        sample = ?split.sample,
        elapsed_ms = step.elapsed().as_millis() as u64,
        "sample drawn"
    );

    let step = Instant::now();
    let mut forest = RandomForest::from_config(&config.forest).with_random_state(seed);
    forest
        .fit(&x_train, &y_train)
        .map_err(|e| e.into_model_error("fitting the forest failed"))?;
    let predictions = forest
        .predict(&x_sample)
        .map_err(|e| e.into_model_error("predicting the sample failed"))?;
    debug!(
        trees = forest.n_trees(),
        training_rows = x_train.nrows(),
        elapsed_ms = step.elapsed().as_millis() as u64,
        "forest fitted"
    );

    let table = DisplayTable::from_features(dataset.feature_names(), &x_sample, &split.sample)?
        .with_prediction(&config.prediction_column, &predictions)?
        .with_image(&config.image_column, &config.image_url)?
        .move_to_front(&[config.image_column.as_str(), config.prediction_column.as_str()])?;
    let grid = GridOptionsBuilder::prediction_grid(&table, &config.image_column, &config.grid)?;

    let step = Instant::now();
    let explain_input = table.feature_matrix()?;
    let explainer = Explainer::new(|x: &Array2<f64>| forest.predict(x), explain_input.clone())?
        .with_config(&config.explainer)
        .with_seed(seed)
        .with_feature_names(table.feature_names());
    let attributions = explainer
        .explain(&explain_input)
        .map_err(|e| e.into_model_error("computing attributions failed"))?;
    debug!(
        algorithm = ?explainer.resolved_algorithm(explain_input.ncols()),
        additivity_error = attributions.max_additivity_error(),
        elapsed_ms = step.elapsed().as_millis() as u64,
        "attributions computed"
    );

    let feature_importances = forest
        .feature_importances()
        .map(|imp| imp.to_vec())
        .unwrap_or_default();

    info!(
        seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "run finished"
    );

    Ok(RunOutput {
        seed,
        dataset: dataset.name().to_string(),
        split,
        table,
        grid,
        attributions,
        feature_importances,
    })
}
