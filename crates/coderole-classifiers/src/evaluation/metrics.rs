use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Precision, recall and F1 for a single label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of samples whose actual label is `label`.
    pub support: usize,
}

/// Counts of (actual, predicted) pairs over the union of both label sets.
///
/// Every pair in `labels x labels` is present, zeros included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ConfusionMatrix {
    /// Compare `actual` and `predicted` positionally.
    pub fn new<A: AsRef<str>, P: AsRef<str>>(actual: &[A], predicted: &[P]) -> Self {
        let labels: Vec<String> = actual
            .iter()
            .map(|a| a.as_ref())
            .chain(predicted.iter().map(|p| p.as_ref()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut counts: BTreeMap<String, BTreeMap<String, usize>> = labels
            .iter()
            .map(|a| (a.clone(), labels.iter().map(|p| (p.clone(), 0)).collect()))
            .collect();

        for (a, p) in actual.iter().zip(predicted) {
            if let Some(count) = counts
                .get_mut(a.as_ref())
                .and_then(|row| row.get_mut(p.as_ref()))
            {
                *count += 1;
            }
        }

        ConfusionMatrix { labels, counts }
    }

    /// Sorted label alphabet.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self, actual: &str, predicted: &str) -> usize {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|row| row.values()).sum()
    }

    pub fn correct(&self) -> usize {
        self.labels.iter().map(|l| self.count(l, l)).sum()
    }

    fn actual_total(&self, label: &str) -> usize {
        self.counts.get(label).map_or(0, |row| row.values().sum())
    }

    fn predicted_total(&self, label: &str) -> usize {
        self.counts
            .values()
            .map(|row| row.get(label).copied().unwrap_or(0))
            .sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    pub fn class_metrics(&self, label: &str) -> ClassMetrics {
        let tp = self.count(label, label);
        let precision = ratio(tp, self.predicted_total(label));
        let recall = ratio(tp, self.actual_total(label));
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        ClassMetrics {
            label: label.to_string(),
            precision,
            recall,
            f1,
            support: self.actual_total(label),
        }
    }

    pub fn per_class(&self) -> Vec<ClassMetrics> {
        self.labels.iter().map(|l| self.class_metrics(l)).collect()
    }

    /// Unweighted mean of the per-label F1 scores; 0 with no labels.
    pub fn macro_f1(&self) -> f64 {
        if self.labels.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.per_class().iter().map(|m| m.f1).sum();
        sum / self.labels.len() as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.len())
            .chain(["actual \\ predicted".len()])
            .max()
            .unwrap_or(0);

        write!(f, "{:<width$}", "actual \\ predicted")?;
        for predicted in &self.labels {
            write!(f, "  {:>width$}", predicted)?;
        }
        writeln!(f)?;
        for actual in &self.labels {
            write!(f, "{:<width$}", actual)?;
            for predicted in &self.labels {
                write!(f, "  {:>width$}", self.count(actual, predicted))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Share of positions where prediction equals the actual label; 0 for no
/// samples.
pub fn accuracy<A: AsRef<str>, P: AsRef<str>>(actual: &[A], predicted: &[P]) -> f64 {
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a.as_ref() == p.as_ref())
        .count();
    ratio(correct, actual.len().min(predicted.len()))
}

/// Macro-averaged F1 over the union of actual and predicted labels.
pub fn macro_f1<A: AsRef<str>, P: AsRef<str>>(actual: &[A], predicted: &[P]) -> f64 {
    ConfusionMatrix::new(actual, predicted).macro_f1()
}
