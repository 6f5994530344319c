//! Session configuration
//!
//! Everything here is plain data: the seed default, the decorative image column,
//! forest hyperparameters, explainer budget, grid and plot options. A config can be
//! loaded from JSON and then overridden by CLI flags.

use crate::error::{ExplainerError, Result};
use crate::explainability::Algorithm;
use crate::training::MaxFeatures;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thumbnail shown in the image column of every row
pub const DEFAULT_IMAGE_URL: &str = "https://i.imgur.com/MYmm7E1.jpeg";

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree (unbounded when `None`)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling per tree
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
        }
    }
}

/// Attribution computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainerConfig {
    /// Algorithm choice; `Auto` picks exact for small feature counts
    pub algorithm: Algorithm,
    /// Model evaluation budget for the permutation algorithm
    pub max_evals: usize,
    /// Largest feature count `Auto` still explains exactly
    pub exact_max_features: usize,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Auto,
            max_evals: 500,
            exact_max_features: 10,
        }
    }
}

/// Grid display options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grow the grid to fit every row
    pub auto_height: bool,
    /// Row height in pixels
    pub row_height: u32,
    /// Thumbnail edge length in pixels
    pub thumbnail_size: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            auto_height: true,
            row_height: 50,
            thumbnail_size: 50,
        }
    }
}

/// Plot options shared by the waterfall and beeswarm plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Features shown individually before the rest are collapsed
    pub max_display: usize,
    /// Plot area width in terminal columns
    pub width: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            max_display: 10,
            width: 56,
        }
    }
}

/// Configuration for one interactive session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed text shown when the session starts
    pub default_seed: String,
    /// Image reference put in every row
    pub image_url: String,
    /// Name of the image column
    pub image_column: String,
    /// Name of the prediction column
    pub prediction_column: String,
    /// Forest hyperparameters
    pub forest: ForestConfig,
    /// Explainer settings
    pub explainer: ExplainerConfig,
    /// Grid options
    pub grid: GridConfig,
    /// Plot options
    pub plot: PlotConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_seed: "1".to_string(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            image_column: "photo".to_string(),
            prediction_column: "prediction".to_string(),
            forest: ForestConfig::default(),
            explainer: ExplainerConfig::default(),
            grid: GridConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExplainerError::ConfigurationError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: SessionConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder method to set the starting seed
    pub fn with_default_seed(mut self, seed: impl Into<String>) -> Self {
        self.default_seed = seed.into();
        self
    }

    /// Builder method to set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.forest.n_estimators = n;
        self
    }

    /// Builder method to cap tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.forest.max_depth = Some(depth);
        self
    }

    /// Builder method to set the explainer algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.explainer.algorithm = algorithm;
        self
    }

    /// Builder method to set the image reference
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    /// Builder method to set plot options
    pub fn with_plot(mut self, plot: PlotConfig) -> Self {
        self.plot = plot;
        self
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.forest.n_estimators == 0 {
            return Err(ExplainerError::ConfigurationError(
                "forest.n_estimators must be at least 1".to_string(),
            ));
        }
        if self.forest.min_samples_split < 2 {
            return Err(ExplainerError::ConfigurationError(
                "forest.min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(ExplainerError::ConfigurationError(
                "forest.min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.image_column.is_empty() || self.prediction_column.is_empty() {
            return Err(ExplainerError::ConfigurationError(
                "image and prediction column names must not be empty".to_string(),
            ));
        }
        if self.image_column == self.prediction_column {
            return Err(ExplainerError::ConfigurationError(format!(
                "image and prediction columns share the name `{}`",
                self.image_column
            )));
        }
        if self.explainer.max_evals == 0 {
            return Err(ExplainerError::ConfigurationError(
                "explainer.max_evals must be at least 1".to_string(),
            ));
        }
        if self.plot.max_display == 0 || self.plot.width < 10 {
            return Err(ExplainerError::ConfigurationError(
                "plot.max_display must be at least 1 and plot.width at least 10".to_string(),
            ));
        }
        Ok(())
    }
}
