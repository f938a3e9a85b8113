//! Labeled sample collections and the operations used to build training,
//! testing and fold subsets.
//!
//! A [`Dataset`] is never mutated in place: splitting, slicing and
//! transforming all return new values that share nothing with the parent.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, Result};
use crate::preprocessing::{FeatureExtractor, FeatureVector};

/// One unit of input: raw source text or its extracted features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Features(FeatureVector),
    Raw(String),
}

impl Sample {
    pub fn is_raw(&self) -> bool {
        matches!(self, Sample::Raw(_))
    }

    pub fn as_features(&self) -> Option<&FeatureVector> {
        match self {
            Sample::Features(features) => Some(features),
            Sample::Raw(_) => None,
        }
    }
}

impl From<FeatureVector> for Sample {
    fn from(features: FeatureVector) -> Self {
        Sample::Features(features)
    }
}

impl From<String> for Sample {
    fn from(code: String) -> Self {
        Sample::Raw(code)
    }
}

impl From<&str> for Sample {
    fn from(code: &str) -> Self {
        Sample::Raw(code.to_string())
    }
}

/// A sample paired with its categorical label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub sample: Sample,
    pub label: String,
}

impl LabeledSample {
    pub fn new(sample: impl Into<Sample>, label: impl Into<String>) -> Self {
        LabeledSample {
            sample: sample.into(),
            label: label.into(),
        }
    }
}

/// Ordered sequence of labeled samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Sample>,
    labels: Vec<String>,
}

impl Dataset {
    /// Pair samples with labels positionally.
    pub fn new(samples: Vec<Sample>, labels: Vec<String>) -> Result<Self> {
        if samples.len() != labels.len() {
            return Err(ClassifierError::InvalidDatasetFormat(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        Ok(Dataset { samples, labels })
    }

    pub fn from_labeled(items: Vec<LabeledSample>) -> Self {
        let (samples, labels) = items.into_iter().map(|item| (item.sample, item.label)).unzip();
        Dataset { samples, labels }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Option<LabeledSample> {
        Some(LabeledSample {
            sample: self.samples.get(index)?.clone(),
            label: self.labels.get(index)?.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Sample, &str)> {
        self.samples
            .iter()
            .zip(self.labels.iter().map(String::as_str))
    }

    /// Sorted, de-duplicated label set.
    pub fn label_alphabet(&self) -> Vec<String> {
        self.labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sequential split into `(training, testing)`.
    ///
    /// `ratio` is the testing share: the first `floor(N * (1 - ratio))`
    /// samples go to training and the remainder to testing, input order
    /// preserved.
    pub fn split(&self, ratio: f64) -> Result<(Dataset, Dataset)> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ClassifierError::InvalidSplitRatio(ratio));
        }
        let n_train = ((self.len() as f64) * (1.0 - ratio)).floor() as usize;
        let n_train = n_train.min(self.len());

        let training = self.slice(0, n_train)?;
        let testing = self.slice(n_train, self.len() - n_train)?;
        Ok((training, testing))
    }

    /// Contiguous copy of `length` samples starting at `offset`.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Dataset> {
        let end = self.checked_end(offset, length)?;
        Ok(Dataset {
            samples: self.samples[offset..end].to_vec(),
            labels: self.labels[offset..end].to_vec(),
        })
    }

    /// Everything except the `length` samples starting at `offset`.
    pub fn without(&self, offset: usize, length: usize) -> Result<Dataset> {
        let end = self.checked_end(offset, length)?;
        let keep = |i: &usize| *i < offset || *i >= end;
        Ok(Dataset {
            samples: (0..self.len())
                .filter(keep)
                .map(|i| self.samples[i].clone())
                .collect(),
            labels: (0..self.len())
                .filter(keep)
                .map(|i| self.labels[i].clone())
                .collect(),
        })
    }

    /// Concatenate `other` after `self`.
    pub fn merge(&self, other: &Dataset) -> Dataset {
        let mut samples = self.samples.clone();
        samples.extend_from_slice(&other.samples);
        let mut labels = self.labels.clone();
        labels.extend_from_slice(&other.labels);
        Dataset { samples, labels }
    }

    /// New dataset where every raw sample has been replaced by its features.
    pub fn extract_features(&self, extractor: &FeatureExtractor) -> Dataset {
        Dataset {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::Features(extractor.features_of(s)))
                .collect(),
            labels: self.labels.clone(),
        }
    }

    pub fn feature_vectors(&self, extractor: &FeatureExtractor) -> Vec<FeatureVector> {
        self.samples.iter().map(|s| extractor.features_of(s)).collect()
    }

    fn checked_end(&self, offset: usize, length: usize) -> Result<usize> {
        match offset.checked_add(length) {
            Some(end) if end <= self.len() => Ok(end),
            _ => Err(ClassifierError::FoldOutOfRange {
                offset,
                length,
                size: self.len(),
            }),
        }
    }
}

/// Stack feature vectors into a `(n_samples, n_features)` matrix.
pub fn feature_matrix(features: &[FeatureVector]) -> Array2<f64> {
    let mut x = Array2::<f64>::zeros((features.len(), FeatureVector::NUM_FEATURES));
    for (mut row, fv) in x.rows_mut().into_iter().zip(features) {
        for (cell, value) in row.iter_mut().zip(fv.to_row()) {
            *cell = value;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Dataset {
        Dataset::new(
            (0..n).map(|i| Sample::Raw(format!("sample {i}"))).collect(),
            (0..n).map(|i| format!("label{}", i % 3)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Dataset::new(vec![Sample::Raw("a".into())], vec![]).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidDatasetFormat(_)));
    }

    #[test]
    fn split_is_sequential_and_conserves_samples() {
        let dataset = numbered(10);
        let (train, test) = dataset.split(0.2).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(train.samples()[0], Sample::Raw("sample 0".into()));
        assert_eq!(test.samples()[0], Sample::Raw("sample 8".into()));
        assert_eq!(train.merge(&test), dataset);
    }

    #[test]
    fn split_floors_the_training_share() {
        for n in 0..25 {
            for ratio in [0.1, 0.25, 0.33, 0.5, 0.9] {
                let dataset = numbered(n);
                let (train, test) = dataset.split(ratio).unwrap();
                assert_eq!(train.len() + test.len(), n);
                assert_eq!(train.len(), ((n as f64) * (1.0 - ratio)).floor() as usize);
                assert_eq!(train.merge(&test), dataset);
            }
        }
    }

    #[test]
    fn split_rejects_out_of_range_ratio() {
        assert!(matches!(
            numbered(4).split(1.5),
            Err(ClassifierError::InvalidSplitRatio(_))
        ));
        assert!(numbered(4).split(-0.1).is_err());
    }

    #[test]
    fn slice_and_without_partition_the_dataset() {
        let dataset = numbered(7);
        let fold = dataset.slice(2, 3).unwrap();
        let rest = dataset.without(2, 3).unwrap();
        assert_eq!(fold.len(), 3);
        assert_eq!(rest.len(), 4);
        assert_eq!(fold.labels()[0], "label2");
        assert_eq!(rest.samples()[2], Sample::Raw("sample 5".into()));
    }

    #[test]
    fn slice_past_the_end_is_an_error() {
        let dataset = numbered(5);
        assert!(dataset.slice(5, 0).is_ok());
        let err = dataset.slice(3, 3).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::FoldOutOfRange { offset: 3, length: 3, size: 5 }
        ));
        assert!(dataset.without(usize::MAX, 2).is_err());
    }

    #[test]
    fn label_alphabet_is_sorted_and_unique() {
        let dataset = Dataset::from_labeled(vec![
            LabeledSample::new("a", "service"),
            LabeledSample::new("b", "controller"),
            LabeledSample::new("c", "service"),
        ]);
        assert_eq!(dataset.label_alphabet(), vec!["controller", "service"]);
        assert_eq!(dataset.get(1).unwrap().label, "controller");
        assert!(dataset.get(3).is_none());
    }

    #[test]
    fn extract_features_returns_a_new_dataset() {
        let dataset = Dataset::from_labeled(vec![LabeledSample::new(
            "class A extends Controller {}",
            "controller",
        )]);
        let extracted = dataset.extract_features(&FeatureExtractor::new());
        assert!(dataset.samples()[0].is_raw());
        assert_eq!(
            extracted.samples()[0].as_features().unwrap().controller_score,
            1
        );
    }

    #[test]
    fn feature_matrix_follows_schema_order() {
        let fv = FeatureVector {
            length: 10,
            provider_score: 2,
            ..FeatureVector::default()
        };
        let x = feature_matrix(&[fv, FeatureVector::default()]);
        assert_eq!(x.shape(), &[2, FeatureVector::NUM_FEATURES]);
        assert_eq!(x[[0, 0]], 10.0);
        assert_eq!(x[[0, 10]], 2.0);
        assert_eq!(x[[1, 0]], 0.0);
    }
}
