use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Directory holding the raw `*.php` samples.
    pub source_dir: String,
    /// Directory that receives `training.json` and `testing.json`.
    pub dest_dir: String,
    /// Share of samples placed in the testing set.
    pub test_ratio: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig {
            source_dir: String::from("data/raw"),
            dest_dir: String::from("data/processed"),
            test_ratio: 0.2,
        }
    }
}

impl PreprocessConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                let config_json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_json::from_str(&config_json)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            }
            None => PreprocessConfig::default(),
        };

        // Apply CLI overrides
        if let Some(source_dir) = matches.get_one::<String>("source_dir") {
            config.source_dir = source_dir.clone();
        }
        if let Some(dest_dir) = matches.get_one::<String>("dest_dir") {
            config.dest_dir = dest_dir.clone();
        }
        if let Some(test_ratio) = matches.get_one::<f64>("test_ratio") {
            config.test_ratio = *test_ratio;
        }

        if !(0.0..=1.0).contains(&config.test_ratio) {
            anyhow::bail!("test_ratio must lie in [0, 1], got {}", config.test_ratio);
        }

        Ok(config)
    }
}
