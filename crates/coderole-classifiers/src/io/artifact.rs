//! JSON dataset artifacts of the form `{"samples": [...], "labels": [...]}`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::data_handling::{Dataset, Sample};
use crate::error::{ClassifierError, Result};
use crate::preprocessing::FeatureVector;

#[derive(Serialize)]
struct DatasetRef<'a> {
    samples: &'a [Sample],
    labels: &'a [String],
}

/// Decode one sample. Objects, and strings that themselves hold a feature
/// object, become [`Sample::Features`]; any other string stays raw.
fn decode_sample(index: usize, value: Value) -> Result<Sample> {
    match value {
        Value::Object(_) => serde_json::from_value::<FeatureVector>(value)
            .map(Sample::Features)
            .map_err(|e| ClassifierError::InvalidDatasetFormat(format!("sample {index}: {e}"))),
        Value::String(text) => Ok(match serde_json::from_str::<FeatureVector>(&text) {
            Ok(features) if text.trim_start().starts_with('{') => Sample::Features(features),
            _ => Sample::Raw(text),
        }),
        other => Err(ClassifierError::InvalidDatasetFormat(format!(
            "sample {index}: unsupported sample shape {other}"
        ))),
    }
}

fn take_array(root: &mut serde_json::Map<String, Value>, field: &str) -> Result<Vec<Value>> {
    match root.remove(field) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ClassifierError::InvalidDatasetFormat(format!(
            "'{field}' must be an array"
        ))),
        None => Err(ClassifierError::InvalidDatasetFormat(format!(
            "missing '{field}' field"
        ))),
    }
}

/// Decode a dataset from an already parsed JSON document.
pub fn dataset_from_value(value: Value) -> Result<Dataset> {
    let mut root = match value {
        Value::Object(root) => root,
        _ => {
            return Err(ClassifierError::InvalidDatasetFormat(
                "top level must be an object".into(),
            ))
        }
    };

    let samples = take_array(&mut root, "samples")?
        .into_iter()
        .enumerate()
        .map(|(i, v)| decode_sample(i, v))
        .collect::<Result<Vec<_>>>()?;

    let labels = take_array(&mut root, "labels")?
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::String(label) => Ok(label),
            other => Err(ClassifierError::InvalidDatasetFormat(format!(
                "label {i} is not a string: {other}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    if samples.len() != labels.len() {
        return Err(ClassifierError::InvalidDatasetFormat(format!(
            "{} samples but {} labels",
            samples.len(),
            labels.len()
        )));
    }
    Dataset::new(samples, labels)
}

pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader).map_err(|e| {
        ClassifierError::InvalidDatasetFormat(format!("{}: {e}", path.display()))
    })?;
    let dataset = dataset_from_value(value)?;
    log::debug!("Loaded {} samples from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Write `dataset` as pretty JSON, creating parent directories as needed.
pub fn save_dataset<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(
        &mut writer,
        &DatasetRef {
            samples: dataset.samples(),
            labels: dataset.labels(),
        },
    )?;
    writer.flush()?;
    log::debug!("Wrote {} samples to {}", dataset.len(), path.display());
    Ok(())
}
