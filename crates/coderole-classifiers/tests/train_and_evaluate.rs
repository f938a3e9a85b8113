//! End-to-end training, evaluation and cross-validation through the public
//! API.

mod common;

use coderole_classifiers::config::ModelParams;
use coderole_classifiers::evaluation::ModelEvaluator;
use coderole_classifiers::{
    Classifier, ClassifierError, CrossValidation, FoldTraining, FeatureExtractor,
};
use serde_json::json;

fn memorizing_tree() -> Classifier {
    let params: ModelParams = json!({"max_leaf_size": 1}).as_object().cloned().unwrap();
    Classifier::from_params("decision_tree", &params).unwrap()
}

// ---------------------------------------------------------------------------
// Training and evaluation
// ---------------------------------------------------------------------------

#[test]
fn sample_lengths_are_distinct() {
    let extractor = FeatureExtractor::new();
    let mut lengths: Vec<u64> = common::ten_roles()
        .feature_vectors(&extractor)
        .iter()
        .map(|f| f.length)
        .collect();
    lengths.sort_unstable();
    lengths.dedup();
    assert_eq!(lengths.len(), 10);
}

#[test]
fn decision_tree_memorizes_its_training_set() {
    common::init_logger();
    let dataset = common::ten_roles();
    let mut classifier = memorizing_tree();
    classifier.train(&dataset).unwrap();

    assert_eq!(
        classifier.labels(),
        ["controller", "model", "provider", "request", "service"]
    );

    let report = ModelEvaluator::new(&classifier).evaluate(&dataset).unwrap();
    assert_eq!(report.samples, 10);
    assert_eq!(report.accuracy, 1.0);
    assert_eq!(report.f1, 1.0);
    assert_eq!(report.confusion.correct(), 10);
}

#[test]
fn evaluation_report_keeps_predictions_aligned_with_labels() {
    let dataset = common::ten_roles();
    let mut classifier = memorizing_tree();
    classifier.train(&dataset).unwrap();

    let report = ModelEvaluator::new(&classifier).evaluate(&dataset).unwrap();
    assert_eq!(report.actual, dataset.labels());
    assert_eq!(report.predictions, classifier.predict_dataset(&dataset).unwrap());
    assert_eq!(report.predictions.len(), report.actual.len());
    for (predicted, actual) in report.predictions.iter().zip(&report.actual) {
        assert_eq!(predicted, actual);
    }

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["predictions"].as_array().unwrap().len(), 10);
    assert_eq!(json["actual"][0], "controller");
}

#[test]
fn evaluate_requires_a_trained_classifier() {
    let classifier = memorizing_tree();
    let err = ModelEvaluator::new(&classifier)
        .evaluate(&common::ten_roles())
        .unwrap_err();
    assert!(matches!(err, ClassifierError::NotTrained));
}

#[test]
fn every_backend_trains_and_predicts_every_sample() {
    common::init_logger();
    let dataset = common::ten_roles();
    let cases = [
        ("random_forest", json!({"trees": 10, "ratio": 1.0})),
        (
            "neural_network",
            json!({"hidden_nodes": 8, "hidden_nodes_2": 4, "epochs": 30, "batch_size": 4}),
        ),
        ("decision_tree", json!({})),
        ("svm", json!({"kernel": "linear"})),
    ];

    for (kind, params) in cases {
        let mut classifier =
            Classifier::from_params(kind, params.as_object().unwrap()).unwrap();
        classifier.train(&dataset).unwrap();
        let predictions = classifier.predict_dataset(&dataset).unwrap();
        assert_eq!(predictions.len(), dataset.len(), "{kind}");
        assert!(
            predictions.iter().all(|p| classifier.labels().contains(p)),
            "{kind} predicted a label outside its alphabet"
        );
    }
}

#[test]
fn svm_kernels_train_on_role_samples() {
    common::init_logger();
    let dataset = common::ten_roles();
    for params in [
        json!({"kernel": "linear"}),
        json!({"kernel": "linear", "shrinking": false}),
        json!({"kernel": "rbf"}),
        json!({"kernel": "poly", "coef0": 1.0}),
    ] {
        let mut classifier = Classifier::from_params("svm", params.as_object().unwrap()).unwrap();
        classifier.train(&dataset).unwrap();
        assert_eq!(classifier.predict_dataset(&dataset).unwrap().len(), 10, "{params}");
    }
}

#[test]
fn classify_batch_preserves_order() {
    let dataset = common::ten_roles();
    let mut classifier = memorizing_tree();
    classifier.train(&dataset).unwrap();

    let codes: Vec<String> = dataset
        .samples()
        .iter()
        .map(|s| match s {
            coderole_classifiers::Sample::Raw(code) => code.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(classifier.classify_batch(&codes).unwrap(), dataset.labels());
    assert_eq!(classifier.classify_batch::<&str>(&[]).unwrap(), Vec::<String>::new());
}

// ---------------------------------------------------------------------------
// Cross-validation
// ---------------------------------------------------------------------------

#[test]
fn cross_validation_reports_one_score_per_fold() {
    common::init_logger();
    let dataset = common::ten_roles();
    let classifier = memorizing_tree();

    let report = ModelEvaluator::new(&classifier)
        .cross_validate(&dataset, 3)
        .unwrap();

    assert_eq!(report.fold_training, FoldTraining::FullDataset);
    assert_eq!(report.folds.len(), 3);
    assert_eq!(report.accuracy.scores.len(), 3);
    assert_eq!(report.f1.scores.len(), 3);
    assert_eq!(
        report.folds.iter().map(|f| f.testing_samples).collect::<Vec<_>>(),
        vec![3, 3, 4]
    );
    // every fold was also in the training data
    assert!(report.folds.iter().all(|f| f.training_samples == 10));
    assert_eq!(report.accuracy.scores, vec![1.0, 1.0, 1.0]);
    assert_eq!(report.accuracy.mean, 1.0);
    assert_eq!(report.accuracy.std, 0.0);

    // the evaluated classifier is never trained by cross-validation
    assert!(!classifier.is_trained());
}

#[test]
fn held_out_folds_are_excluded_on_request() {
    let dataset = common::ten_roles();
    let classifier = memorizing_tree();

    let report = ModelEvaluator::new(&classifier)
        .cross_validate_with(
            &dataset,
            CrossValidation {
                folds: 5,
                fold_training: FoldTraining::ExcludeHeldOut,
            },
        )
        .unwrap();

    assert_eq!(report.folds.len(), 5);
    for (i, fold) in report.folds.iter().enumerate() {
        assert_eq!(fold.fold, i);
        assert_eq!(fold.offset, 2 * i);
        assert_eq!(fold.testing_samples, 2);
        assert_eq!(fold.training_samples, 8);
    }

    let scores = &report.accuracy.scores;
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let std = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64).sqrt();
    assert!((report.accuracy.mean - mean).abs() < 1e-12);
    assert!((report.accuracy.std - std).abs() < 1e-12);
}

#[test]
fn more_folds_than_samples_scores_empty_folds_as_zero() {
    let dataset = common::ten_roles().slice(0, 3).unwrap();
    let classifier = memorizing_tree();

    let report = ModelEvaluator::new(&classifier)
        .cross_validate(&dataset, 5)
        .unwrap();

    assert_eq!(report.folds.len(), 5);
    assert_eq!(
        report.folds.iter().map(|f| f.testing_samples).collect::<Vec<_>>(),
        vec![0, 0, 0, 0, 3]
    );
    for fold in &report.folds[..4] {
        assert_eq!(fold.accuracy, 0.0);
        assert_eq!(fold.f1, 0.0);
    }
    assert_eq!(report.folds[4].accuracy, 1.0);
    assert_eq!(report.folds[4].f1, 1.0);

    // scores [0, 0, 0, 0, 1]: mean 0.2, population std sqrt(0.8 / 5) = 0.4
    assert!((report.accuracy.mean - 0.2).abs() < 1e-12);
    assert!((report.accuracy.std - 0.4).abs() < 1e-12);
    assert!((report.f1.mean - 0.2).abs() < 1e-12);
    assert!((report.f1.std - 0.4).abs() < 1e-12);
}

#[test]
fn zero_folds_is_an_error() {
    let classifier = memorizing_tree();
    let err = ModelEvaluator::new(&classifier)
        .cross_validate(&common::ten_roles(), 0)
        .unwrap_err();
    assert!(matches!(err, ClassifierError::InvalidFoldCount(0)));
}
