use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::config::ClassifierConfig;
use crate::error::{ClassifierError, Result};
use crate::models::{Backend, Classifier, ClassifierModel};

/// Bumped whenever the encoded layout changes.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk form of a trained [`Classifier`].
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub config: ClassifierConfig,
    pub labels: Vec<String>,
    pub backend: Backend,
}

/// Borrowed twin of [`ModelArtifact`]; encodes to the same bytes.
#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    format_version: u32,
    config: &'a ClassifierConfig,
    labels: &'a [String],
    backend: &'a Backend,
}

/// Write a trained classifier to `path`.
///
/// The blob is written to a temporary file next to `path` and renamed into
/// place, so readers never observe a half-written model.
pub fn save_model<P: AsRef<Path>>(classifier: &Classifier, path: P) -> Result<()> {
    let path = path.as_ref();
    if !classifier.is_trained() {
        return Err(ClassifierError::NotTrained);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let artifact = ModelArtifactRef {
        format_version: FORMAT_VERSION,
        config: classifier.config(),
        labels: classifier.labels(),
        backend: classifier.backend(),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        bincode::serialize_into(&mut writer, &artifact)
            .map_err(|e| ClassifierError::Serialization(e.to_string()))?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| ClassifierError::Io(e.error))?;

    log::info!("Saved {} model to {}", classifier.kind(), path.display());
    Ok(())
}

/// Read a classifier written by [`save_model`]. The result is ready to
/// predict.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Classifier> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ClassifierError::ModelFileNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let artifact: ModelArtifact = bincode::deserialize_from(reader)
        .map_err(|e| ClassifierError::Serialization(e.to_string()))?;

    if artifact.format_version != FORMAT_VERSION {
        return Err(ClassifierError::Serialization(format!(
            "unsupported model format version {} (expected {})",
            artifact.format_version, FORMAT_VERSION
        )));
    }
    if artifact.labels.is_empty() || !artifact.backend.is_fitted() {
        return Err(ClassifierError::Serialization(
            "model artifact holds no fitted backend".into(),
        ));
    }

    log::debug!(
        "Loaded {} model with labels {:?} from {}",
        artifact.config.kind(),
        artifact.labels,
        path.display()
    );
    Ok(Classifier::from_parts(
        artifact.config,
        artifact.labels,
        artifact.backend,
    ))
}
