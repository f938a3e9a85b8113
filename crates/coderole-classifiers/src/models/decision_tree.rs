use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::DecisionTreeParams;
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Single CART tree grown with Gini impurity.
#[derive(Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: DecisionTreeParams,
    model: Option<DecisionTree<f64, usize>>,
}

impl DecisionTreeClassifier {
    pub fn new(params: DecisionTreeParams) -> Self {
        DecisionTreeClassifier {
            params,
            model: None,
        }
    }

    pub fn params(&self) -> &DecisionTreeParams {
        &self.params
    }
}

/// Grow one tree on `(x, y)`. Shared with the forest so that every member
/// uses the same stopping rules.
pub(crate) fn grow_tree(
    params: &DecisionTreeParams,
    x: Array2<f64>,
    y: Array1<usize>,
) -> Result<DecisionTree<f64, usize>> {
    let dataset = Dataset::new(x, y);
    // A node holding `max_leaf_size` samples or fewer is never split.
    DecisionTree::<f64, usize>::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(params.max_height)
        .min_weight_split((params.max_leaf_size + 1) as f32)
        .min_weight_leaf(1.0)
        .min_impurity_decrease(params.min_purity_increase.max(f64::EPSILON))
        .fit(&dataset)
        .map_err(ClassifierError::estimator)
}

pub(crate) fn predict_tree(tree: &DecisionTree<f64, usize>, x: &Array2<f64>) -> Vec<usize> {
    let predictions: Array1<usize> = tree.predict(x);
    predictions.to_vec()
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], _n_classes: usize) -> Result<()> {
        let tree = grow_tree(&self.params, x.to_owned(), Array1::from_vec(y.to_vec()))?;
        self.model = Some(tree);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let tree = self.model.as_ref().ok_or(ClassifierError::NotTrained)?;
        Ok(predict_tree(tree, x))
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn name(&self) -> &str {
        "Classification Tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn memorizes_separable_points() {
        let x = array![
            [0.0, 1.0],
            [0.0, 2.0],
            [5.0, 1.0],
            [5.0, 2.0],
            [9.0, 9.0],
            [9.0, 8.0]
        ];
        let y = vec![0, 0, 1, 1, 2, 2];
        let mut model = DecisionTreeClassifier::new(DecisionTreeParams {
            max_leaf_size: 1,
            ..Default::default()
        });
        assert!(!model.is_fitted());
        model.fit(&x, &y, 3).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn predict_before_fit_is_rejected() {
        let model = DecisionTreeClassifier::new(DecisionTreeParams::default());
        let err = model.predict(&array![[1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, ClassifierError::NotTrained));
    }

    #[test]
    fn single_class_predicts_that_class() {
        let x = array![[1.0], [2.0], [3.0]];
        let mut model = DecisionTreeClassifier::new(DecisionTreeParams::default());
        model.fit(&x, &[0, 0, 0], 1).unwrap();
        assert_eq!(model.predict(&array![[10.0]]).unwrap(), vec![0]);
    }
}
