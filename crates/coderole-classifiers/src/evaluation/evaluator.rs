use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data_handling::Dataset;
use crate::error::{ClassifierError, Result};
use crate::evaluation::metrics::{accuracy, macro_f1};
use crate::evaluation::reports::{CrossValidationReport, EvaluationReport, FoldResult};
use crate::models::Classifier;

/// What each cross-validation fold is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldTraining {
    /// Train on the whole dataset, held-out fold included. Scores are
    /// optimistic because every test fold was also seen during training.
    #[default]
    FullDataset,
    /// Train on everything except the held-out fold.
    ExcludeHeldOut,
}

impl fmt::Display for FoldTraining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldTraining::FullDataset => f.write_str("trained on full dataset"),
            FoldTraining::ExcludeHeldOut => f.write_str("held-out fold excluded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub folds: usize,
    pub fold_training: FoldTraining,
}

impl Default for CrossValidation {
    fn default() -> Self {
        CrossValidation {
            folds: 5,
            fold_training: FoldTraining::default(),
        }
    }
}

/// `(offset, length)` of every fold. The last fold absorbs the remainder.
pub fn fold_bounds(n: usize, folds: usize) -> Result<Vec<(usize, usize)>> {
    if folds == 0 {
        return Err(ClassifierError::InvalidFoldCount(folds));
    }
    let size = n / folds;
    Ok((0..folds)
        .map(|i| {
            let offset = i * size;
            let length = if i + 1 == folds { n - offset } else { size };
            (offset, length)
        })
        .collect())
}

/// Scores a classifier on held-out data and by k-fold cross-validation.
pub struct ModelEvaluator<'a> {
    classifier: &'a Classifier,
}

impl<'a> ModelEvaluator<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        ModelEvaluator { classifier }
    }

    /// Predict `testing` with the trained classifier and compare
    /// positionally against its labels.
    pub fn evaluate(&self, testing: &Dataset) -> Result<EvaluationReport> {
        let predictions = self.classifier.predict_dataset(testing)?;
        let report = EvaluationReport::from_predictions(testing.labels(), &predictions);
        log::info!(
            "Evaluated {} samples: accuracy {:.4}, macro F1 {:.4}",
            report.samples,
            report.accuracy,
            report.f1
        );
        Ok(report)
    }

    pub fn cross_validate(&self, dataset: &Dataset, folds: usize) -> Result<CrossValidationReport> {
        self.cross_validate_with(
            dataset,
            CrossValidation {
                folds,
                ..Default::default()
            },
        )
    }

    /// k-fold cross-validation. Each fold trains a fresh classifier from the
    /// evaluated classifier's config; the evaluated classifier itself is
    /// left untouched.
    pub fn cross_validate_with(
        &self,
        dataset: &Dataset,
        cv: CrossValidation,
    ) -> Result<CrossValidationReport> {
        let bounds = fold_bounds(dataset.len(), cv.folds)?;
        let config = self.classifier.config();

        log::info!(
            "Cross-validating {} on {} samples with {} folds ({})",
            config.kind(),
            dataset.len(),
            cv.folds,
            cv.fold_training
        );

        let folds = bounds
            .into_par_iter()
            .enumerate()
            .map(|(fold, (offset, length))| {
                let testing = dataset.slice(offset, length)?;
                let training = match cv.fold_training {
                    FoldTraining::FullDataset => dataset.clone(),
                    FoldTraining::ExcludeHeldOut => dataset.without(offset, length)?,
                };

                let mut classifier = Classifier::new(config.clone());
                classifier.train(&training)?;
                let predictions = classifier.predict_dataset(&testing)?;

                let result = FoldResult {
                    fold,
                    offset,
                    training_samples: training.len(),
                    testing_samples: testing.len(),
                    accuracy: accuracy(testing.labels(), &predictions),
                    f1: macro_f1(testing.labels(), &predictions),
                };
                log::debug!(
                    "Fold {}: accuracy {:.4}, F1 {:.4}",
                    fold + 1,
                    result.accuracy,
                    result.f1
                );
                Ok(result)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CrossValidationReport::from_folds(cv.fold_training, folds))
    }
}
