use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coderole_classifiers::io::save_dataset;
use coderole_classifiers::preprocessing::Pipeline;
use coderole_classifiers::{CodeNormalizer, Dataset, FeatureExtractor, LabeledSample};

use crate::preprocess::input::PreprocessConfig;
use crate::util::validate_directory;

/// Role label implied by a sample's file name. The first matching marker
/// wins, so `AppServiceProvider.php` is a service.
pub fn infer_label(file_name: &str) -> &'static str {
    const MARKERS: [(&str, &str); 4] = [
        ("Controller", "controller"),
        ("Service", "service"),
        ("Provider", "provider"),
        ("Request", "request"),
    ];
    MARKERS
        .iter()
        .find(|(marker, _)| file_name.contains(marker))
        .map(|(_, label)| *label)
        .unwrap_or("model")
}

/// `*.php` files directly inside `dir`, sorted by file name.
pub fn collect_php_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("php") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessSummary {
    pub training_samples: usize,
    pub testing_samples: usize,
}

/// Read, label, normalize and featurize the raw samples, then write the
/// training and testing splits. Any unreadable file aborts the run.
pub fn run_preprocess(config: &PreprocessConfig) -> Result<PreprocessSummary> {
    let source = Path::new(&config.source_dir);
    validate_directory(source)?;

    let mut samples = Vec::new();
    for path in collect_php_files(source)? {
        let code = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read sample file: {:?}", path))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let label = infer_label(file_name);
        log::debug!("{} -> {}", file_name, label);
        samples.push(LabeledSample::new(code, label));
    }
    log::info!("Loaded {} samples from {:?}", samples.len(), source);

    let pipeline = Pipeline::new()
        .with(CodeNormalizer::new())
        .with(FeatureExtractor::new());
    let dataset: Dataset = pipeline.apply(&Dataset::from_labeled(samples))?;

    let (training, testing) = dataset.split(config.test_ratio)?;

    let dest = Path::new(&config.dest_dir);
    save_dataset(&training, dest.join("training.json"))
        .with_context(|| format!("Failed to write training set to {:?}", dest))?;
    save_dataset(&testing, dest.join("testing.json"))
        .with_context(|| format!("Failed to write testing set to {:?}", dest))?;

    log::info!(
        "Wrote {} training and {} testing samples to {:?}",
        training.len(),
        testing.len(),
        dest
    );

    Ok(PreprocessSummary {
        training_samples: training.len(),
        testing_samples: testing.len(),
    })
}
