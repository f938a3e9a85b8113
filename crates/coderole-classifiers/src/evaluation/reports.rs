use std::fmt;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::evaluation::evaluator::FoldTraining;
use crate::evaluation::metrics::{ClassMetrics, ConfusionMatrix};

/// Result of scoring a classifier on one testing set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// Macro-averaged F1.
    pub f1: f64,
    pub samples: usize,
    pub confusion: ConfusionMatrix,
    pub per_class: Vec<ClassMetrics>,
    /// Predicted labels, aligned with `actual`.
    pub predictions: Vec<String>,
    /// Ground-truth labels of the evaluated set.
    pub actual: Vec<String>,
}

impl EvaluationReport {
    pub fn from_predictions<A: AsRef<str>, P: AsRef<str>>(actual: &[A], predicted: &[P]) -> Self {
        let confusion = ConfusionMatrix::new(actual, predicted);
        EvaluationReport {
            accuracy: confusion.accuracy(),
            f1: confusion.macro_f1(),
            samples: actual.len(),
            per_class: confusion.per_class(),
            confusion,
            predictions: predicted.iter().map(|p| p.as_ref().to_string()).collect(),
            actual: actual.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "F1 Score: {:.2}%", self.f1 * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Confusion Matrix:")?;
        write!(f, "{}", self.confusion)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<12} {:>9} {:>9} {:>9} {:>8}",
            "label", "precision", "recall", "f1", "support"
        )?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:<12} {:>9.4} {:>9.4} {:>9.4} {:>8}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// Per-fold scores of one metric with their mean and population standard
/// deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl MetricSummary {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        if scores.is_empty() {
            return MetricSummary {
                scores,
                mean: 0.0,
                std: 0.0,
            };
        }
        let mean = scores.iter().mean();
        let std = scores.iter().population_std_dev();
        MetricSummary { scores, mean, std }
    }
}

/// Scores for one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: usize,
    pub offset: usize,
    pub training_samples: usize,
    pub testing_samples: usize,
    pub accuracy: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub fold_training: FoldTraining,
    pub folds: Vec<FoldResult>,
    pub accuracy: MetricSummary,
    pub f1: MetricSummary,
}

impl CrossValidationReport {
    pub fn from_folds(fold_training: FoldTraining, folds: Vec<FoldResult>) -> Self {
        let accuracy = MetricSummary::from_scores(folds.iter().map(|f| f.accuracy).collect());
        let f1 = MetricSummary::from_scores(folds.iter().map(|f| f.f1).collect());
        CrossValidationReport {
            fold_training,
            folds,
            accuracy,
            f1,
        }
    }
}

impl fmt::Display for CrossValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cross-validation ({} folds, {}):", self.folds.len(), self.fold_training)?;
        for fold in &self.folds {
            writeln!(
                f,
                "  Fold {}: accuracy {:.2}%, F1 {:.2}% ({} train / {} test)",
                fold.fold + 1,
                fold.accuracy * 100.0,
                fold.f1 * 100.0,
                fold.training_samples,
                fold.testing_samples
            )?;
        }
        writeln!(f, "Mean Accuracy: {:.2}%", self.accuracy.mean * 100.0)?;
        writeln!(f, "Accuracy Std Dev: {:.2}%", self.accuracy.std * 100.0)?;
        writeln!(f, "Mean F1 Score: {:.2}%", self.f1.mean * 100.0)?;
        writeln!(f, "F1 Score Std Dev: {:.2}%", self.f1.std * 100.0)
    }
}
