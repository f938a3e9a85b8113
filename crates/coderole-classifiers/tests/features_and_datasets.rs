//! Feature extraction scenarios and dataset splitting through the public
//! API.

mod common;

use coderole_classifiers::preprocessing::{Pipeline, Transformer};
use coderole_classifiers::{CodeNormalizer, Dataset, FeatureExtractor, FeatureVector, Sample};

#[test]
fn class_with_one_method() {
    let features = FeatureExtractor::new().extract("class Foo { public function bar() {} }");
    assert_eq!(features.class_count, 1);
    assert_eq!(features.function_count, 1);
    assert_eq!(features.namespace_count, 0);
    assert_eq!(features.use_count, 0);
    assert_eq!(features.controller_score, 0);
    assert_eq!(features.eloquent_score, 0);
}

#[test]
fn controller_snippet_scores_three() {
    let code = "class HomeController extends Controller {\n    public function index() {\n        return view('home');\n    }\n}";
    assert_eq!(FeatureExtractor::new().extract(code).controller_score, 3);
}

#[test]
fn schema_has_eleven_keys_in_order() {
    let keys: Vec<&str> = FeatureVector::default().iter().map(|(k, _)| k).collect();
    assert_eq!(keys.len(), 11);
    assert_eq!(keys.first(), Some(&"length"));
    assert_eq!(keys.last(), Some(&"provider_score"));

    let json = serde_json::to_value(FeatureVector::default()).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 11);
}

#[test]
fn extraction_is_deterministic() {
    let extractor = FeatureExtractor::new();
    for (sample, _) in common::ten_roles().iter() {
        if let Sample::Raw(code) = sample {
            assert_eq!(extractor.extract(code), extractor.extract(code));
        }
    }
}

#[test]
fn split_then_merge_restores_the_dataset() {
    let dataset = common::ten_roles();
    let (training, testing) = dataset.split(0.3).unwrap();
    assert_eq!(training.len(), 7);
    assert_eq!(testing.len(), 3);
    assert_eq!(training.merge(&testing), dataset);
}

#[test]
fn pipeline_extracts_without_touching_its_input() {
    let dataset = common::ten_roles();
    let pipeline = Pipeline::new()
        .with(CodeNormalizer::new())
        .with(FeatureExtractor::new());
    assert_eq!(pipeline.stage_names(), vec!["Code Normalizer", "Feature Extractor"]);

    let transformed = pipeline.apply(&dataset).unwrap();
    assert_eq!(transformed.len(), dataset.len());
    assert_eq!(transformed.labels(), dataset.labels());
    assert!(transformed.samples().iter().all(|s| s.as_features().is_some()));
    assert!(dataset.samples().iter().all(Sample::is_raw));

    // extracting from normalized text gives the same vectors as from raw text
    let direct = dataset.extract_features(&FeatureExtractor::new());
    assert_eq!(transformed, direct);
}

#[test]
fn normalizer_transform_leaves_features_alone() {
    let features = Sample::Features(FeatureVector {
        length: 3,
        ..Default::default()
    });
    let out = CodeNormalizer::new().transform(vec![features.clone(), Sample::Raw("A  B".into())]);
    assert_eq!(out, vec![features, Sample::Raw("a b".into())]);
}

#[test]
fn label_alphabet_is_sorted_and_unique() {
    let dataset: Dataset = common::ten_roles();
    assert_eq!(
        dataset.label_alphabet(),
        vec!["controller", "model", "provider", "request", "service"]
    );
}
