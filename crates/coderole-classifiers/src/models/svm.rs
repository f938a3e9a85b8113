use std::panic::{catch_unwind, AssertUnwindSafe};

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_svm::Svm;
use ndarray::{Array1, Array2, ArrayView1, Ix1};
use serde::{Deserialize, Serialize};

use crate::config::{SvmKernel, SvmParams};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{argmax, ClassifierModel};
use crate::preprocessing::{fit_scaler, Scaler};

/// Multi-class SVM built as one-vs-rest over binary SVMs.
///
/// Features are standardized before fitting. The predicted class is the
/// machine with the largest decision value `w·x - rho`.
#[derive(Serialize, Deserialize)]
pub struct SvmClassifier {
    params: SvmParams,
    scaler: Option<Scaler>,
    machines: Vec<Svm<f64, bool>>,
    /// Set when training saw a single class; no machine is fitted then.
    constant: Option<usize>,
}

impl SvmClassifier {
    pub fn new(params: SvmParams) -> Self {
        SvmClassifier {
            params,
            scaler: None,
            machines: Vec::new(),
            constant: None,
        }
    }

    pub fn params(&self) -> &SvmParams {
        &self.params
    }

    fn solve(&self, dataset: &Dataset<f64, bool, Ix1>, shrinking: bool) -> Result<Svm<f64, bool>> {
        let p = &self.params;
        let base = Svm::<f64, bool>::params()
            .eps(p.tolerance)
            .pos_neg_weights(p.c, p.c)
            .shrinking(shrinking);

        let model = match p.kernel {
            SvmKernel::Linear => base.linear_kernel(),
            SvmKernel::Rbf => {
                let gamma = p.gamma.unwrap_or(1.0 / dataset.records().ncols().max(1) as f64);
                // linfa's gaussian kernel is exp(-|a - b|^2 / eps)
                base.gaussian_kernel(1.0 / gamma)
            }
            SvmKernel::Polynomial => base.polynomial_kernel(p.coef0, p.degree),
        };

        // linfa's SMO shrinking heuristic can underflow its active-set
        // counter on small problems and panic.
        match catch_unwind(AssertUnwindSafe(|| model.fit(dataset))) {
            Ok(fitted) => fitted.map_err(ClassifierError::estimator),
            Err(_) => Err(ClassifierError::Estimator(
                "SMO solver panicked while shrinking".into(),
            )),
        }
    }

    fn fit_binary(&self, x: &Array2<f64>, targets: Array1<bool>) -> Result<Svm<f64, bool>> {
        let dataset = Dataset::new(x.to_owned(), targets);
        if !self.params.shrinking {
            return self.solve(&dataset, false);
        }
        self.solve(&dataset, true).or_else(|err| {
            log::warn!("{err}; refitting without shrinking");
            self.solve(&dataset, false)
        })
    }
}

fn decision_value(machine: &Svm<f64, bool>, row: ArrayView1<f64>) -> f64 {
    machine.weighted_sum(&row) - machine.rho
}

impl ClassifierModel for SvmClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let scaler = fit_scaler(x);
        let xs = scaler.transform(x);

        let first = *y.first().ok_or(ClassifierError::EmptyDataset)?;
        if n_classes < 2 || y.iter().all(|&label| label == first) {
            log::warn!("SVM training data holds a single class; predictions will be constant");
            self.machines.clear();
            self.constant = Some(first);
            self.scaler = Some(scaler);
            return Ok(());
        }

        let machines = (0..n_classes)
            .map(|class| {
                let targets: Array1<bool> = y.iter().map(|&label| label == class).collect();
                self.fit_binary(&xs, targets)
            })
            .collect::<Result<Vec<_>>>()?;

        self.machines = machines;
        self.constant = None;
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let scaler = self.scaler.as_ref().ok_or(ClassifierError::NotTrained)?;
        if let Some(class) = self.constant {
            return Ok(vec![class; x.nrows()]);
        }

        let xs = scaler.transform(x);
        Ok(xs
            .rows()
            .into_iter()
            .map(|row| {
                argmax(
                    self.machines
                        .iter()
                        .map(|machine| decision_value(machine, row)),
                )
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.scaler.is_some()
    }

    fn name(&self) -> &str {
        "Support Vector Classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn three_clusters() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [0.3, 0.2],
            [5.0, 5.0],
            [5.2, 4.9],
            [4.8, 5.1],
            [5.1, 5.2],
            [0.0, 9.0],
            [0.2, 9.1],
            [0.1, 8.8],
            [0.3, 9.2]
        ];
        (x, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2])
    }

    #[test]
    fn one_vs_rest_separates_clusters() {
        let (x, y) = three_clusters();
        let mut svm = SvmClassifier::new(SvmParams::default());
        svm.fit(&x, &y, 3).unwrap();
        assert!(svm.is_fitted());
        let predictions = svm.predict(&x).unwrap();
        let correct = predictions.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 10, "only {correct} of 12 correct");
    }

    #[test]
    fn every_kernel_fits_with_and_without_shrinking() {
        let (x, y) = three_clusters();
        for kernel in [SvmKernel::Rbf, SvmKernel::Linear, SvmKernel::Polynomial] {
            for shrinking in [true, false] {
                let mut svm = SvmClassifier::new(SvmParams {
                    kernel,
                    shrinking,
                    ..SvmParams::default()
                });
                svm.fit(&x, &y, 3).unwrap();
                assert_eq!(svm.predict(&x).unwrap().len(), 12);
            }
        }
    }

    #[test]
    fn single_class_training_is_constant() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let mut svm = SvmClassifier::new(SvmParams::default());
        svm.fit(&x, &[1, 1], 2).unwrap();
        assert_eq!(svm.predict(&array![[9.0, 9.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn predict_before_fit_is_rejected() {
        let svm = SvmClassifier::new(SvmParams::default());
        assert!(matches!(
            svm.predict(&array![[0.0, 0.0]]),
            Err(ClassifierError::NotTrained)
        ));
    }
}
