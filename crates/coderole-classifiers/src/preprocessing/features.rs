//! Fixed-schema feature extraction for source-code samples.
//!
//! Every snippet is normalized first and all counts, including `length`
//! and `line_count`, are computed on the normalized text, so extraction
//! gives the same vector whether or not the caller normalized first.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data_handling::Sample;
use crate::preprocessing::normalizer::CodeNormalizer;
use crate::preprocessing::pipeline::Transformer;

const CLASS_PATTERN: &str = r"class\s+\w+";
const FUNCTION_PATTERN: &str = r"function\s+\w+";
const NAMESPACE_PATTERN: &str = r"namespace\s+[\w\\]+";
const USE_PATTERN: &str = r"use\s+[\w\\]+";

const ELOQUENT_PATTERNS: &[&str] = &[
    r"\$table\s*=",
    r"\$fillable\s*=",
    r"\$guarded\s*=",
    r"\$casts\s*=",
    r"\$with\s*=",
    r"\$appends\s*=",
    r"\$hidden\s*=",
    r"\$timestamps\s*=",
    r"belongsto\(",
    r"hasmany\(",
    r"hasone\(",
    r"belongstomany\(",
    r"wherehas\(",
    r"orderby\(",
    r"groupby\(",
    r"join\(",
];

const CONTROLLER_PATTERNS: &[&str] = &[
    r"extends\s+controller",
    r"public\s+function\s+index",
    r"public\s+function\s+show",
    r"public\s+function\s+store",
    r"public\s+function\s+update",
    r"public\s+function\s+destroy",
    r"return\s+view\(",
    r"return\s+redirect\(",
    r"return\s+response\(",
    r"return\s+json\(",
];

const REQUEST_PATTERNS: &[&str] = &[
    r"extends\s+formrequest",
    r"public\s+function\s+rules",
    r"public\s+function\s+authorize",
    r"\$request->validate\(",
    r"\$request->validated\(",
];

// The normalizer drops backslashes, so the namespace pattern never fires on
// normalized text.
const SERVICE_PATTERNS: &[&str] = &[r"namespace\s+app\\services", r"class\s+\w+service"];

const PROVIDER_PATTERNS: &[&str] = &[
    r"extends\s+serviceprovider",
    r"public\s+function\s+register",
    r"public\s+function\s+boot",
    r"\$this->app->singleton\(",
    r"\$this->app->bind\(",
];

/// Idiom buckets scored by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Eloquent,
    Controller,
    Request,
    Service,
    Provider,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Eloquent,
        Category::Controller,
        Category::Request,
        Category::Service,
        Category::Provider,
    ];

    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Category::Eloquent => ELOQUENT_PATTERNS,
            Category::Controller => CONTROLLER_PATTERNS,
            Category::Request => REQUEST_PATTERNS,
            Category::Service => SERVICE_PATTERNS,
            Category::Provider => PROVIDER_PATTERNS,
        }
    }

    /// Feature key holding this category's score.
    pub fn feature_key(&self) -> &'static str {
        match self {
            Category::Eloquent => "eloquent_score",
            Category::Controller => "controller_score",
            Category::Request => "request_score",
            Category::Service => "service_score",
            Category::Provider => "provider_score",
        }
    }
}

/// Numeric summary of one code sample.
///
/// Field order is the schema order; it is the column order of every feature
/// matrix and the key order of the JSON representation. Keys missing from
/// JSON read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    pub length: u64,
    pub line_count: u64,
    pub class_count: u64,
    pub function_count: u64,
    pub namespace_count: u64,
    pub use_count: u64,
    pub eloquent_score: u64,
    pub controller_score: u64,
    pub request_score: u64,
    pub service_score: u64,
    pub provider_score: u64,
}

impl FeatureVector {
    pub const NUM_FEATURES: usize = 11;

    pub const KEYS: [&'static str; FeatureVector::NUM_FEATURES] = [
        "length",
        "line_count",
        "class_count",
        "function_count",
        "namespace_count",
        "use_count",
        "eloquent_score",
        "controller_score",
        "request_score",
        "service_score",
        "provider_score",
    ];

    pub fn values(&self) -> [u64; FeatureVector::NUM_FEATURES] {
        [
            self.length,
            self.line_count,
            self.class_count,
            self.function_count,
            self.namespace_count,
            self.use_count,
            self.eloquent_score,
            self.controller_score,
            self.request_score,
            self.service_score,
            self.provider_score,
        ]
    }

    /// Values as a matrix row, in schema order.
    pub fn to_row(&self) -> [f64; FeatureVector::NUM_FEATURES] {
        self.values().map(|v| v as f64)
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        FeatureVector::KEYS
            .iter()
            .position(|k| *k == key)
            .map(|idx| self.values()[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> {
        FeatureVector::KEYS.into_iter().zip(self.values())
    }

    fn set_category_score(&mut self, category: Category, score: u64) {
        match category {
            Category::Eloquent => self.eloquent_score = score,
            Category::Controller => self.controller_score = score,
            Category::Request => self.request_score = score,
            Category::Service => self.service_score = score,
            Category::Provider => self.provider_score = score,
        }
    }
}

#[derive(Debug, Clone)]
struct CategoryMatcher {
    category: Category,
    patterns: Vec<Regex>,
}

impl CategoryMatcher {
    fn score(&self, text: &str) -> u64 {
        self.patterns.iter().map(|p| count_matches(p, text)).sum()
    }
}

fn count_matches(pattern: &Regex, text: &str) -> u64 {
    pattern.find_iter(text).count() as u64
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("feature pattern {pattern:?} must compile: {e}"))
}

/// Stateless text-to-[`FeatureVector`] transform.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    normalizer: CodeNormalizer,
    class_decl: Regex,
    function_decl: Regex,
    namespace_decl: Regex,
    use_decl: Regex,
    categories: Vec<CategoryMatcher>,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        let categories = Category::ALL
            .iter()
            .map(|&category| CategoryMatcher {
                category,
                patterns: category.patterns().iter().map(|p| compile(p)).collect(),
            })
            .collect();

        FeatureExtractor {
            normalizer: CodeNormalizer::new(),
            class_decl: compile(CLASS_PATTERN),
            function_decl: compile(FUNCTION_PATTERN),
            namespace_decl: compile(NAMESPACE_PATTERN),
            use_decl: compile(USE_PATTERN),
            categories,
        }
    }

    pub fn extract(&self, code: &str) -> FeatureVector {
        let text = self.normalizer.normalize(code);

        let mut features = FeatureVector {
            length: text.len() as u64,
            line_count: text.matches('\n').count() as u64 + 1,
            class_count: count_matches(&self.class_decl, &text),
            function_count: count_matches(&self.function_decl, &text),
            namespace_count: count_matches(&self.namespace_decl, &text),
            use_count: count_matches(&self.use_decl, &text),
            ..FeatureVector::default()
        };

        for matcher in &self.categories {
            features.set_category_score(matcher.category, matcher.score(&text));
        }

        features
    }

    pub fn extract_all<S: AsRef<str>>(&self, codes: &[S]) -> Vec<FeatureVector> {
        codes.iter().map(|c| self.extract(c.as_ref())).collect()
    }

    /// Features of a sample, extracting raw text on the fly.
    pub fn features_of(&self, sample: &Sample) -> FeatureVector {
        match sample {
            Sample::Raw(code) => self.extract(code),
            Sample::Features(features) => *features,
        }
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for FeatureExtractor {
    fn transform(&self, samples: Vec<Sample>) -> Vec<Sample> {
        samples
            .into_iter()
            .map(|sample| match sample {
                Sample::Raw(code) => Sample::Features(self.extract(&code)),
                features => features,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "Feature Extractor"
    }
}
