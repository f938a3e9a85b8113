use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coderole_classifiers::Classifier;

/// Classify each file with the model at `model_path`, returning
/// `(file, label)` pairs in input order.
pub fn classify_files(model_path: &Path, files: &[PathBuf]) -> Result<Vec<(PathBuf, String)>> {
    let classifier = Classifier::load(model_path)
        .with_context(|| format!("Failed to load model from {:?}", model_path))?;

    let codes = files
        .iter()
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
        })
        .collect::<Result<Vec<_>>>()?;

    let labels = classifier.classify_batch(&codes)?;
    Ok(files.iter().cloned().zip(labels).collect())
}
