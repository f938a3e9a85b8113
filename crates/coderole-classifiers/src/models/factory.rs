use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::DecisionTreeClassifier;
use crate::models::neural_network::NeuralNetworkClassifier;
use crate::models::random_forest::RandomForestClassifier;
use crate::models::svm::SvmClassifier;

/// Closed set of learning backends. Kept as an enum rather than a trait
/// object so that fitted models serialize directly.
#[derive(Serialize, Deserialize)]
pub enum Backend {
    RandomForest(RandomForestClassifier),
    NeuralNetwork(NeuralNetworkClassifier),
    DecisionTree(DecisionTreeClassifier),
    Svm(SvmClassifier),
}

/// Build an unfitted backend from a validated config.
pub fn build_model(config: &ClassifierConfig) -> Backend {
    match config {
        ClassifierConfig::RandomForest(p) => {
            Backend::RandomForest(RandomForestClassifier::new(p.clone()))
        }
        ClassifierConfig::NeuralNetwork(p) => {
            Backend::NeuralNetwork(NeuralNetworkClassifier::new(p.clone()))
        }
        ClassifierConfig::DecisionTree(p) => {
            Backend::DecisionTree(DecisionTreeClassifier::new(p.clone()))
        }
        ClassifierConfig::Svm(p) => Backend::Svm(SvmClassifier::new(p.clone())),
    }
}

impl Backend {
    fn inner(&self) -> &dyn ClassifierModel {
        match self {
            Backend::RandomForest(m) => m,
            Backend::NeuralNetwork(m) => m,
            Backend::DecisionTree(m) => m,
            Backend::Svm(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ClassifierModel {
        match self {
            Backend::RandomForest(m) => m,
            Backend::NeuralNetwork(m) => m,
            Backend::DecisionTree(m) => m,
            Backend::Svm(m) => m,
        }
    }
}

impl ClassifierModel for Backend {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        self.inner_mut().fit(x, y, n_classes)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        self.inner().predict(x)
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name())
            .field("fitted", &self.is_fitted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    #[test]
    fn builds_an_unfitted_backend_for_every_kind() {
        for kind in BackendKind::ALL {
            let backend = build_model(&ClassifierConfig::defaults_for(kind));
            assert!(!backend.is_fitted());
            assert_ne!(backend.name(), "classifier");
        }
    }
}
