use ndarray::Array2;

use crate::error::Result;

/// Contract shared by every learning backend.
///
/// Backends see only numeric feature matrices and dense class indices in
/// `0..n_classes`. Mapping between indices and label strings is the job of
/// [`crate::models::Classifier`].
pub trait ClassifierModel {
    /// Fit the model from scratch on `x` (rows are samples) and class
    /// indices `y`. Any previously learned state is discarded.
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()>;

    /// Predict one class index per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>>;

    fn is_fitted(&self) -> bool;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Index of the largest score, preferring the lowest index on ties.
pub(crate) fn argmax<I: IntoIterator<Item = f64>>(scores: I) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, score) in scores.into_iter().enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    best
}
