//! Error types for the forest explainer

use thiserror::Error;

/// Result type alias for explainer operations
pub type Result<T> = std::result::Result<T, ExplainerError>;

/// User-facing error category.
///
/// Every run failure is shown inline under one of these four headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad seed or configuration
    Configuration,
    /// Dataset missing, unreadable or too small
    DataUnavailable,
    /// Model fit, prediction or explanation failure
    Model,
    /// Display backend failure
    Render,
}

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum ExplainerError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid selection: row {index} is outside a table of {rows} rows")]
    InvalidSelection { index: usize, rows: usize },

    #[error("Nothing rendered: send a request first")]
    NotRendered,
}

impl ExplainerError {
    /// Category shown to the user
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExplainerError::ConfigurationError(_)
            | ExplainerError::InvalidSelection { .. }
            | ExplainerError::NotRendered => ErrorKind::Configuration,
            ExplainerError::DataUnavailable(_) => ErrorKind::DataUnavailable,
            ExplainerError::ModelError(_)
            | ExplainerError::ShapeError { .. }
            | ExplainerError::ModelNotFitted => ErrorKind::Model,
            ExplainerError::RenderError(_) => ErrorKind::Render,
        }
    }

    /// Re-wrap a low-level failure as a model error, keeping the message.
    ///
    /// Configuration errors keep their category.
    pub fn into_model_error(self, context: &str) -> Self {
        match self {
            ExplainerError::ModelError(msg) => ExplainerError::ModelError(msg),
            ExplainerError::ConfigurationError(msg) => ExplainerError::ConfigurationError(msg),
            other => ExplainerError::ModelError(format!("{}: {}", context, other)),
        }
    }
}

impl From<polars::error::PolarsError> for ExplainerError {
    fn from(err: polars::error::PolarsError) -> Self {
        ExplainerError::DataUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for ExplainerError {
    fn from(err: serde_json::Error) -> Self {
        ExplainerError::ConfigurationError(err.to_string())
    }
}

/// Writing to the display is the only I/O after data loading.
impl From<std::io::Error> for ExplainerError {
    fn from(err: std::io::Error) -> Self {
        ExplainerError::RenderError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ExplainerError {
    fn from(err: ndarray::ShapeError) -> Self {
        ExplainerError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
