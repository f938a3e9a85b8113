//! Transformer chain applied to datasets.
//!
//! Stages are pure: each one consumes a sample list and returns a new one,
//! so applying a pipeline never touches the input [`Dataset`].

use crate::data_handling::{Dataset, Sample};
use crate::error::Result;

/// A stage in the preprocessing chain.
pub trait Transformer: Send + Sync {
    /// Learn from the samples before transforming. Stateless stages keep the
    /// default no-op and never need to be fitted before [`transform`](Self::transform).
    fn fit(&mut self, _samples: &[Sample]) {}

    fn transform(&self, samples: Vec<Sample>) -> Vec<Sample>;

    fn name(&self) -> &str {
        "transformer"
    }
}

/// Ordered list of transformer stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Transformer>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Transformer + 'static>(mut self, stage: T) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over the dataset's samples, returning a new dataset
    /// with the same labels.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        let mut samples = dataset.samples().to_vec();
        for stage in &self.stages {
            log::debug!("Applying {} to {} samples", stage.name(), samples.len());
            samples = stage.transform(samples);
        }
        Dataset::new(samples, dataset.labels().to_vec())
    }

    /// Fit each stage on the output of the previous one, then transform.
    pub fn fit_apply(&mut self, dataset: &Dataset) -> Result<Dataset> {
        let mut samples = dataset.samples().to_vec();
        for stage in self.stages.iter_mut() {
            stage.fit(&samples);
            log::debug!("Applying {} to {} samples", stage.name(), samples.len());
            samples = stage.transform(samples);
        }
        Dataset::new(samples, dataset.labels().to_vec())
    }
}
