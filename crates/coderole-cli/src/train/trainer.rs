use anyhow::{Context, Result};
use coderole_classifiers::evaluation::{CrossValidationReport, EvaluationReport};
use coderole_classifiers::io::load_dataset;
use coderole_classifiers::report::training_report;
use coderole_classifiers::{Classifier, CrossValidation, FoldTraining, ModelEvaluator};

use crate::train::input::TrainConfig;

/// Everything a training run produced.
pub struct TrainingOutcome {
    pub classifier: Classifier,
    pub evaluation: EvaluationReport,
    pub cross_validation: Option<CrossValidationReport>,
}

/// Train, save, evaluate and (when the training set is large enough)
/// cross-validate a classifier. The textual report goes to stdout.
pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
    println!("Loading datasets...");
    let training = load_dataset(&config.training_data)
        .with_context(|| format!("Failed to load training data: {}", config.training_data))?;
    let testing = load_dataset(&config.testing_data)
        .with_context(|| format!("Failed to load testing data: {}", config.testing_data))?;
    println!("Training set: {} samples", training.len());
    println!("Testing set: {} samples", testing.len());

    println!("Creating model...");
    let classifier_config = config
        .model
        .classifier_config()
        .context("Invalid model configuration")?;
    let mut classifier = Classifier::new(classifier_config);

    println!("Training model...");
    classifier.train(&training).context("Training failed")?;

    println!("Saving model to {}...", config.model.model_path.display());
    classifier
        .save(&config.model.model_path)
        .with_context(|| format!("Failed to save model to {:?}", config.model.model_path))?;

    println!("Evaluating model...");
    let evaluator = ModelEvaluator::new(&classifier);
    let evaluation = evaluator.evaluate(&testing).context("Evaluation failed")?;
    println!();
    println!("Evaluation Results:");
    print!("{}", evaluation);

    let cross_validation = if training.len() >= config.min_cv_samples {
        println!("Performing cross-validation...");
        let fold_training = if config.exclude_held_out {
            FoldTraining::ExcludeHeldOut
        } else {
            FoldTraining::FullDataset
        };
        let report = evaluator
            .cross_validate_with(
                &training,
                CrossValidation {
                    folds: config.folds,
                    fold_training,
                },
            )
            .context("Cross-validation failed")?;
        println!("Cross-Validation Results:");
        print!("{}", report);
        Some(report)
    } else {
        println!("Dataset too small for meaningful cross-validation.");
        None
    };

    if let Some(report_file) = &config.report_file {
        training_report(
            &classifier,
            &evaluation,
            cross_validation.as_ref(),
            training.len(),
        )?
        .save_to_file(report_file)
        .with_context(|| format!("Failed to write report to {}", report_file))?;
    }

    println!("Model training and evaluation complete.");
    Ok(TrainingOutcome {
        classifier,
        evaluation,
        cross_validation,
    })
}
