use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DecisionTreeParams, RandomForestParams};
use crate::error::{ClassifierError, Result};
use crate::models::classifier_trait::{argmax, ClassifierModel};
use crate::models::decision_tree::{grow_tree, predict_tree};

/// Bootstrap-aggregated ensemble of classification trees.
///
/// Every tree is grown on `max(1, round(sample_ratio * n))` rows drawn with
/// replacement. Tree `i` draws from an RNG seeded with `seed + i`, so a
/// forest is reproducible regardless of how rayon schedules the work.
/// Predictions are majority votes.
#[derive(Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: RandomForestParams,
    trees: Vec<DecisionTree<f64, usize>>,
    n_classes: usize,
}

impl RandomForestClassifier {
    pub fn new(params: RandomForestParams) -> Self {
        RandomForestClassifier {
            params,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Per-sample weights inversely proportional to class frequency.
fn balanced_weights(y: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in y {
        counts[label] += 1;
    }
    y.iter().map(|&label| 1.0 / counts[label] as f64).collect()
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(ClassifierError::EmptyDataset);
        }
        let bootstrap_size = ((self.params.sample_ratio * n as f64).round() as usize).max(1);
        let sampler = if self.params.balanced {
            Some(
                WeightedIndex::new(balanced_weights(y, n_classes))
                    .map_err(ClassifierError::estimator)?,
            )
        } else {
            None
        };
        let tree_params = DecisionTreeParams::default();
        let seed = self.params.seed;

        log::debug!(
            "Growing {} trees on bootstrap samples of {} rows",
            self.params.trees,
            bootstrap_size
        );

        let trees = (0..self.params.trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                let rows: Vec<usize> = match &sampler {
                    Some(weighted) => (0..bootstrap_size).map(|_| weighted.sample(&mut rng)).collect(),
                    None => (0..bootstrap_size).map(|_| rng.gen_range(0..n)).collect(),
                };
                let xs = x.select(Axis(0), &rows);
                let ys: Array1<usize> = rows.iter().map(|&r| y[r]).collect();
                grow_tree(&tree_params, xs, ys)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        if self.trees.is_empty() {
            return Err(ClassifierError::NotTrained);
        }
        let mut votes = Array2::<f64>::zeros((x.nrows(), self.n_classes.max(1)));
        for tree in &self.trees {
            for (row, class) in predict_tree(tree, x).into_iter().enumerate() {
                votes[[row, class]] += 1.0;
            }
        }
        Ok(votes
            .rows()
            .into_iter()
            .map(|row| argmax(row.iter().copied()))
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn name(&self) -> &str {
        "Random Forest"
    }
}
