use std::collections::HashMap;
use std::path::Path;

use crate::config::{BackendKind, ClassifierConfig, ModelParams};
use crate::data_handling::{feature_matrix, Dataset};
use crate::error::{ClassifierError, Result};
use crate::io::model::{load_model, save_model};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::{build_model, Backend};
use crate::preprocessing::{FeatureExtractor, FeatureVector};

/// Label-level classifier: owns the backend config, the fitted backend and
/// the label alphabet that maps class indices back to role names.
#[derive(Debug)]
pub struct Classifier {
    config: ClassifierConfig,
    backend: Backend,
    labels: Vec<String>,
    extractor: FeatureExtractor,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Classifier {
            backend: build_model(&config),
            config,
            labels: Vec::new(),
            extractor: FeatureExtractor::new(),
        }
    }

    pub fn from_params(kind: &str, params: &ModelParams) -> Result<Self> {
        Ok(Classifier::new(ClassifierConfig::from_params(kind, params)?))
    }

    pub(crate) fn from_parts(
        config: ClassifierConfig,
        labels: Vec<String>,
        backend: Backend,
    ) -> Self {
        Classifier {
            config,
            backend,
            labels,
            extractor: FeatureExtractor::new(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn kind(&self) -> BackendKind {
        self.config.kind()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn is_trained(&self) -> bool {
        !self.labels.is_empty() && self.backend.is_fitted()
    }

    /// Sorted label alphabet learned during training.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Train a fresh backend on `dataset`. Raw samples are run through the
    /// feature extractor first. On failure the previous model is kept.
    pub fn train(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        let labels = dataset.label_alphabet();
        let index: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.as_str(), i))
            .collect();
        let y: Vec<usize> = dataset
            .labels()
            .iter()
            .map(|label| index[label.as_str()])
            .collect();
        let x = feature_matrix(&dataset.feature_vectors(&self.extractor));

        let mut backend = build_model(&self.config);
        log::info!(
            "Training {} on {} samples with {} labels",
            backend.name(),
            dataset.len(),
            labels.len()
        );
        backend.fit(&x, &y, labels.len())?;

        self.backend = backend;
        self.labels = labels;
        Ok(())
    }

    /// One label per feature vector, in input order.
    pub fn predict(&self, features: &[FeatureVector]) -> Result<Vec<String>> {
        if !self.is_trained() {
            return Err(ClassifierError::NotTrained);
        }
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let classes = self.backend.predict(&feature_matrix(features))?;
        classes
            .into_iter()
            .map(|class| {
                self.labels.get(class).cloned().ok_or_else(|| {
                    ClassifierError::Estimator(format!("backend predicted unknown class {class}"))
                })
            })
            .collect()
    }

    pub fn predict_dataset(&self, dataset: &Dataset) -> Result<Vec<String>> {
        if !self.is_trained() {
            return Err(ClassifierError::NotTrained);
        }
        self.predict(&dataset.feature_vectors(&self.extractor))
    }

    /// Normalize, extract and classify a single source file.
    pub fn classify_code(&self, code: &str) -> Result<String> {
        let mut labels = self.classify_batch(&[code])?;
        labels
            .pop()
            .ok_or_else(|| ClassifierError::Estimator("no prediction returned".into()))
    }

    pub fn classify_batch<S: AsRef<str>>(&self, codes: &[S]) -> Result<Vec<String>> {
        if !self.is_trained() {
            return Err(ClassifierError::NotTrained);
        }
        self.predict(&self.extractor.extract_all(codes))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_model(self, path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_model(path)
    }
}
