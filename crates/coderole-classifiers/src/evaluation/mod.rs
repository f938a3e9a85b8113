//! Scoring of trained classifiers: hold-out evaluation, k-fold
//! cross-validation and the metrics behind both.

pub mod evaluator;
pub mod metrics;
pub mod reports;

pub use evaluator::{fold_bounds, CrossValidation, FoldTraining, ModelEvaluator};
pub use metrics::{accuracy, macro_f1, ClassMetrics, ConfusionMatrix};
pub use reports::{CrossValidationReport, EvaluationReport, FoldResult, MetricSummary};
