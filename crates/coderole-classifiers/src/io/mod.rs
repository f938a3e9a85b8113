//! Reading and writing of dataset artifacts and fitted models.

pub mod artifact;
pub mod model;

pub use artifact::{load_dataset, save_dataset};
pub use model::{load_model, save_model, ModelArtifact, FORMAT_VERSION};
