use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClassifierError, Result};
use crate::models::Classifier;

/// Flat, backend-agnostic hyperparameter mapping as found in config files.
pub type ModelParams = serde_json::Map<String, Value>;

/// Supported backend kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    RandomForest,
    NeuralNetwork,
    DecisionTree,
    Svm,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::RandomForest,
        BackendKind::NeuralNetwork,
        BackendKind::DecisionTree,
        BackendKind::Svm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::RandomForest => "random_forest",
            BackendKind::NeuralNetwork => "neural_network",
            BackendKind::DecisionTree => "decision_tree",
            BackendKind::Svm => "svm",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ClassifierError::UnsupportedBackendKind(s.to_string()))
    }
}

/// Bagged ensemble of classification trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestParams {
    pub trees: usize,
    /// Bootstrap size of each tree as a share of the training set.
    #[serde(alias = "ratio")]
    pub sample_ratio: f64,
    /// Draw bootstrap samples with inverse class-frequency weights.
    pub balanced: bool,
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        RandomForestParams {
            trees: 100,
            sample_ratio: 0.2,
            balanced: false,
            seed: 0,
        }
    }
}

/// Two-hidden-layer feed-forward network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralNetworkParams {
    pub hidden_nodes: usize,
    pub hidden_nodes_2: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub l2_penalty: f64,
    pub bias: bool,
    pub epochs: usize,
    /// Minimum loss improvement that resets the early-stopping window.
    pub min_change: f64,
    pub window: usize,
    pub seed: u64,
}

impl Default for NeuralNetworkParams {
    fn default() -> Self {
        NeuralNetworkParams {
            hidden_nodes: 100,
            hidden_nodes_2: 50,
            batch_size: 128,
            learning_rate: 0.001,
            l2_penalty: 0.0,
            bias: true,
            epochs: 1000,
            min_change: 1e-4,
            window: 5,
            seed: 0,
        }
    }
}

/// Single CART classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTreeParams {
    /// `None` grows the tree without a depth limit.
    pub max_height: Option<usize>,
    /// Nodes holding this many samples or fewer become leaves.
    pub max_leaf_size: usize,
    pub min_purity_increase: f64,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        DecisionTreeParams {
            max_height: None,
            max_leaf_size: 3,
            min_purity_increase: 1e-7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SvmKernel {
    #[default]
    #[serde(alias = "gauss", alias = "gaussian")]
    Rbf,
    Linear,
    #[serde(alias = "poly")]
    Polynomial,
}

/// Margin-based classifier (one-vs-rest over binary SVMs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmParams {
    pub c: f64,
    pub kernel: SvmKernel,
    pub shrinking: bool,
    pub tolerance: f64,
    /// RBF width; `None` means `1 / n_features`.
    pub gamma: Option<f64>,
    pub degree: f64,
    pub coef0: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        SvmParams {
            c: 1.0,
            kernel: SvmKernel::Rbf,
            shrinking: true,
            tolerance: 1e-3,
            gamma: None,
            degree: 3.0,
            coef0: 0.0,
        }
    }
}

/// Backend selection together with that backend's validated parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierConfig {
    RandomForest(RandomForestParams),
    NeuralNetwork(NeuralNetworkParams),
    DecisionTree(DecisionTreeParams),
    Svm(SvmParams),
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig::RandomForest(RandomForestParams::default())
    }
}

impl ClassifierConfig {
    /// Build a config from a backend tag and a flat parameter mapping.
    ///
    /// Missing or `null` keys take the backend defaults and unknown keys are
    /// ignored.
    pub fn from_params(kind: &str, params: &ModelParams) -> Result<Self> {
        let kind: BackendKind = kind.parse()?;
        let mut cleaned: ModelParams = params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fold_key_aliases(kind, &mut cleaned);
        let value = Value::Object(cleaned);

        let config = match kind {
            BackendKind::RandomForest => ClassifierConfig::RandomForest(parse_params(kind, value)?),
            BackendKind::NeuralNetwork => {
                ClassifierConfig::NeuralNetwork(parse_params(kind, value)?)
            }
            BackendKind::DecisionTree => ClassifierConfig::DecisionTree(parse_params(kind, value)?),
            BackendKind::Svm => ClassifierConfig::Svm(parse_params(kind, value)?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Default parameters for a backend kind.
    pub fn defaults_for(kind: BackendKind) -> Self {
        match kind {
            BackendKind::RandomForest => ClassifierConfig::RandomForest(Default::default()),
            BackendKind::NeuralNetwork => ClassifierConfig::NeuralNetwork(Default::default()),
            BackendKind::DecisionTree => ClassifierConfig::DecisionTree(Default::default()),
            BackendKind::Svm => ClassifierConfig::Svm(Default::default()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            ClassifierConfig::RandomForest(_) => BackendKind::RandomForest,
            ClassifierConfig::NeuralNetwork(_) => BackendKind::NeuralNetwork,
            ClassifierConfig::DecisionTree(_) => BackendKind::DecisionTree,
            ClassifierConfig::Svm(_) => BackendKind::Svm,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let kind = self.kind().as_str();
        let check = |ok: bool, message: &str| {
            if ok {
                Ok(())
            } else {
                Err(ClassifierError::invalid_hyperparameter(kind, message))
            }
        };

        match self {
            ClassifierConfig::RandomForest(p) => {
                check(p.trees >= 1, "trees must be at least 1")?;
                check(
                    p.sample_ratio > 0.0 && p.sample_ratio <= 1.5,
                    "sample_ratio must lie in (0, 1.5]",
                )
            }
            ClassifierConfig::NeuralNetwork(p) => {
                check(p.hidden_nodes >= 1, "hidden_nodes must be at least 1")?;
                check(p.hidden_nodes_2 >= 1, "hidden_nodes_2 must be at least 1")?;
                check(p.batch_size >= 1, "batch_size must be at least 1")?;
                check(p.learning_rate > 0.0, "learning_rate must be positive")?;
                check(p.l2_penalty >= 0.0, "l2_penalty must not be negative")?;
                check(p.epochs >= 1, "epochs must be at least 1")?;
                check(p.min_change >= 0.0, "min_change must not be negative")?;
                check(p.window >= 1, "window must be at least 1")
            }
            ClassifierConfig::DecisionTree(p) => {
                check(p.max_height != Some(0), "max_height must be at least 1")?;
                check(p.max_leaf_size >= 1, "max_leaf_size must be at least 1")?;
                check(
                    p.min_purity_increase >= 0.0,
                    "min_purity_increase must not be negative",
                )
            }
            ClassifierConfig::Svm(p) => {
                check(p.c > 0.0, "c must be positive")?;
                check(p.tolerance > 0.0, "tolerance must be positive")?;
                check(p.gamma.map_or(true, |g| g > 0.0), "gamma must be positive")?;
                check(p.degree > 0.0, "degree must be positive")
            }
        }
    }
}

/// Alternate spellings accepted for hyperparameter keys, as
/// `(backend, alias, canonical)`.
const KEY_ALIASES: &[(BackendKind, &str, &str)] =
    &[(BackendKind::RandomForest, "ratio", "sample_ratio")];

/// Rename alias keys to their canonical name. The canonical key wins when
/// both are present.
fn fold_key_aliases(kind: BackendKind, params: &mut ModelParams) {
    for &(backend, alias, canonical) in KEY_ALIASES {
        if backend != kind {
            continue;
        }
        if let Some(value) = params.remove(alias) {
            if !params.contains_key(canonical) {
                params.insert(canonical.to_string(), value);
            }
        }
    }
}

fn parse_params<T: DeserializeOwned>(kind: BackendKind, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ClassifierError::invalid_hyperparameter(kind.as_str(), e.to_string()))
}

/// Model wiring settings: where the model lives and how to build a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub model_path: PathBuf,
    pub model_type: String,
    pub model_params: ModelParams,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let mut model_params = ModelParams::new();
        model_params.insert("trees".into(), Value::from(100));
        model_params.insert("ratio".into(), Value::from(0.2));
        model_params.insert("balanced".into(), Value::from(false));

        ModelSettings {
            model_path: PathBuf::from("data/models/code_classifier.model"),
            model_type: BackendKind::RandomForest.as_str().to_string(),
            model_params,
        }
    }
}

impl ModelSettings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn classifier_config(&self) -> Result<ClassifierConfig> {
        ClassifierConfig::from_params(&self.model_type, &self.model_params)
    }

    /// Load the model at `model_path` when it exists, otherwise construct a
    /// new untrained classifier from `model_type` and `model_params`.
    pub fn open(&self) -> Result<Classifier> {
        if self.model_path.exists() {
            log::info!("Loading existing model from {:?}", self.model_path);
            Classifier::load(&self.model_path)
        } else {
            log::info!(
                "No model at {:?}; creating an untrained {} classifier",
                self.model_path,
                self.model_type
            );
            Ok(Classifier::new(self.classifier_config()?))
        }
    }
}
