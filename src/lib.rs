//! Forest Explainer - seeded random forest predictions with SHAP plots
//!
//! Each run draws five rows from a regression dataset with a user-chosen seed,
//! trains a random forest on the remaining rows, predicts the held-out rows and
//! explains those predictions with Shapley values.
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - datasets, memoized loading, seeded sampling
//! - [`training`] - regression trees and the random forest
//! - [`explainability`] - exact and permutation SHAP explainers
//!
//! ## Presentation
//! - [`display`] - prediction table, grid options, terminal plots
//! - [`session`] - the run pipeline and the per-session state machine
//! - [`cli`] - command-line interface
//!
//! ## Support
//! - [`config`] - session configuration
//! - [`error`] - error type

// Core error handling
pub mod error;
pub mod config;

// Core modules
pub mod data;
pub mod training;
pub mod explainability;

// Presentation
pub mod display;
pub mod session;
pub mod cli;

pub use error::{ExplainerError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ErrorKind, ExplainerError, Result};

    // Configuration
    pub use crate::config::{ExplainerConfig, ForestConfig, GridConfig, PlotConfig, SessionConfig};

    // Data
    pub use crate::data::{parse_seed, Dataset, DatasetCache, DatasetSource, SampleSplit, SAMPLE_SIZE};

    // Training
    pub use crate::training::{MaxFeatures, RandomForest};

    // Explainability
    pub use crate::explainability::{Algorithm, AttributionSet, Explainer, LocalExplanation, ShapSummary};

    // Display
    pub use crate::display::{DisplayTable, GridOptions, Renderer, TableHandle, TerminalDisplay};

    // Session
    pub use crate::session::{run_pipeline, RunOutput, RunState, Session};
}
