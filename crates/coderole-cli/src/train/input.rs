use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use coderole_classifiers::{BackendKind, ModelSettings};
use serde::{Deserialize, Serialize};

use crate::util::validate_json_file;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub training_data: String,
    pub testing_data: String,
    /// `model_path`, `model_type` and `model_params`.
    #[serde(flatten)]
    pub model: ModelSettings,
    pub folds: usize,
    /// Minimum training set size before cross-validation is attempted.
    pub min_cv_samples: usize,
    /// Train each fold without its held-out samples.
    pub exclude_held_out: bool,
    pub report_file: Option<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            training_data: String::from("data/processed/training.json"),
            testing_data: String::from("data/processed/testing.json"),
            model: ModelSettings::default(),
            folds: 5,
            min_cv_samples: 10,
            exclude_held_out: false,
            report_file: None,
        }
    }
}

impl TrainConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let config_json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_json::from_str(&config_json)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            }
            None => TrainConfig::default(),
        };

        // Apply CLI overrides
        if let Some(training_data) = matches.get_one::<String>("training_data") {
            config.training_data = training_data.clone();
        }
        validate_json_file(&config.training_data)?;

        if let Some(testing_data) = matches.get_one::<String>("testing_data") {
            config.testing_data = testing_data.clone();
        }
        validate_json_file(&config.testing_data)?;

        if let Some(output_file) = matches.get_one::<PathBuf>("output_file") {
            config.model.model_path = output_file.clone();
        }

        if let Some(model_type) = matches.get_one::<String>("model_type") {
            config.model.model_type = model_type.clone();
        }
        config
            .model
            .model_type
            .parse::<BackendKind>()
            .with_context(|| format!("Invalid model_type in {:?}", config_path))?;

        if let Some(folds) = matches.get_one::<usize>("folds") {
            config.folds = *folds;
        }
        if config.folds == 0 {
            anyhow::bail!("folds must be at least 1");
        }

        if matches.get_flag("exclude_held_out") {
            config.exclude_held_out = true;
        }

        if let Some(report_file) = matches.get_one::<String>("report_file") {
            config.report_file = Some(report_file.clone());
        }

        Ok(config)
    }
}
