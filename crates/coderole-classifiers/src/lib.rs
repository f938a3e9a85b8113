//! coderole-classifiers: role classification of PHP source files.
//!
//! This crate turns source text into a fixed 11-key feature vector
//! (normalization plus keyword and regex counts), trains one of four
//! interchangeable backends (random forest, neural network, decision tree,
//! SVM) on labeled datasets, and scores the result by hold-out evaluation
//! and k-fold cross-validation. Fitted models persist to a single binary
//! artifact.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod report;

pub use config::{BackendKind, ClassifierConfig, ModelParams, ModelSettings};
pub use data_handling::{Dataset, LabeledSample, Sample};
pub use error::{ClassifierError, Result};
pub use evaluation::{CrossValidation, FoldTraining, ModelEvaluator};
pub use models::Classifier;
pub use preprocessing::{CodeNormalizer, FeatureExtractor, FeatureVector};
