use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the classification pipeline.
///
/// All variants describe local, non-retryable conditions: a programming
/// error, a bad artifact or a bad parameter. Nothing in the pipeline
/// performs retries or partial-failure recovery.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Unsupported backend kind: '{0}'. Expected one of random_forest, neural_network, decision_tree, svm")]
    UnsupportedBackendKind(String),

    #[error("Classifier has not been trained or loaded")]
    NotTrained,

    #[error("Model file not found: {}", .0.display())]
    ModelFileNotFound(PathBuf),

    #[error("Invalid dataset format: {0}")]
    InvalidDatasetFormat(String),

    #[error("Fold out of range: offset {offset} + length {length} exceeds {size} samples")]
    FoldOutOfRange {
        offset: usize,
        length: usize,
        size: usize,
    },

    #[error("Invalid hyperparameter for {kind}: {message}")]
    InvalidHyperparameter { kind: String, message: String },

    #[error("Split ratio must lie in [0, 1], got {0}")]
    InvalidSplitRatio(f64),

    #[error("Number of folds must be at least 1, got {0}")]
    InvalidFoldCount(usize),

    #[error("Cannot train on an empty dataset")]
    EmptyDataset,

    #[error("Estimator error: {0}")]
    Estimator(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassifierError {
    pub fn invalid_hyperparameter(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ClassifierError::InvalidHyperparameter {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn estimator<E: std::fmt::Display>(err: E) -> Self {
        ClassifierError::Estimator(err.to_string())
    }
}

impl From<candle_core::Error> for ClassifierError {
    fn from(err: candle_core::Error) -> Self {
        ClassifierError::estimator(err)
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
