use maud::{html, Markup};

use crate::evaluation::{ConfusionMatrix, CrossValidationReport, EvaluationReport};
use crate::models::{Classifier, ClassifierModel};
use crate::error::Result;
use crate::report::builder::{Report, ReportSection};

fn confusion_table(cm: &ConfusionMatrix) -> Markup {
    html! {
        table {
            tr {
                th { "actual \\ predicted" }
                @for label in cm.labels() { th { (label) } }
            }
            @for actual in cm.labels() {
                tr {
                    th { (actual) }
                    @for predicted in cm.labels() {
                        @if actual == predicted {
                            td class="diagonal" { (cm.count(actual, predicted)) }
                        } @else {
                            td { (cm.count(actual, predicted)) }
                        }
                    }
                }
            }
        }
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Build the HTML report for one training run.
pub fn training_report(
    classifier: &Classifier,
    evaluation: &EvaluationReport,
    cross_validation: Option<&CrossValidationReport>,
    training_samples: usize,
) -> Result<Report> {
    let mut report = Report::new(
        "coderole",
        env!("CARGO_PKG_VERSION"),
        &format!("Code Role Classifier Report ({})", classifier.kind()),
    );

    let mut overview = ReportSection::new("Overview");
    overview.add_content(html! {
        p {
            "Model: " strong { (classifier.backend().name()) }
            ", trained on " (training_samples) " samples, evaluated on "
            (evaluation.samples) " samples."
        }
        p { "Labels: " (classifier.labels().join(", ")) }
        table {
            tr { th { "Accuracy" } td { (percent(evaluation.accuracy)) } }
            tr { th { "F1 Score (macro)" } td { (percent(evaluation.f1)) } }
        }
    });
    report.add_section(overview);

    let mut confusion = ReportSection::new("Confusion Matrix");
    confusion.add_content(confusion_table(&evaluation.confusion));
    confusion.add_content(html! {
        table {
            tr { th { "label" } th { "precision" } th { "recall" } th { "f1" } th { "support" } }
            @for m in &evaluation.per_class {
                tr {
                    td { (m.label) }
                    td { (format!("{:.4}", m.precision)) }
                    td { (format!("{:.4}", m.recall)) }
                    td { (format!("{:.4}", m.f1)) }
                    td { (m.support) }
                }
            }
        }
    });
    report.add_section(confusion);

    let mut cv_section = ReportSection::new("Cross-Validation");
    match cross_validation {
        Some(cv) => cv_section.add_content(html! {
            p { (cv.folds.len()) " folds, " (cv.fold_training.to_string()) "." }
            table {
                tr { th { "fold" } th { "train" } th { "test" } th { "accuracy" } th { "F1" } }
                @for fold in &cv.folds {
                    tr {
                        td { (fold.fold + 1) }
                        td { (fold.training_samples) }
                        td { (fold.testing_samples) }
                        td { (percent(fold.accuracy)) }
                        td { (percent(fold.f1)) }
                    }
                }
                tr {
                    th { "mean \u{b1} std" }
                    td {}
                    td {}
                    td { (percent(cv.accuracy.mean)) " \u{b1} " (percent(cv.accuracy.std)) }
                    td { (percent(cv.f1.mean)) " \u{b1} " (percent(cv.f1.std)) }
                }
            }
        }),
        None => cv_section.add_content(html! {
            p class="note" { "Dataset too small for meaningful cross-validation." }
        }),
    }
    report.add_section(cv_section);

    let mut config_section = ReportSection::new("Configuration");
    let config_json = serde_json::to_string_pretty(classifier.config())?;
    config_section.add_content(html! {
        div class="code-container" {
            pre { code { (config_json) } }
        }
    });
    report.add_section(config_section);

    Ok(report)
}
