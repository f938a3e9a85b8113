//! Text preprocessing: normalization, feature extraction, the transformer
//! chain and column scaling.

pub mod features;
pub mod normalizer;
pub mod pipeline;
pub mod scaler;

pub use features::{Category, FeatureExtractor, FeatureVector};
pub use normalizer::CodeNormalizer;
pub use pipeline::{Pipeline, Transformer};
pub use scaler::{fit_scaler, Scaler};
