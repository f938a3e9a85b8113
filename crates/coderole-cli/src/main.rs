use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use log::LevelFilter;

use coderole_cli::classify::classify_files;
use coderole_cli::cli::build_cli;
use coderole_cli::preprocess::input::PreprocessConfig;
use coderole_cli::preprocess::runner;
use coderole_cli::train::input::TrainConfig;
use coderole_cli::train::trainer;
use coderole_cli::util::print_config_template;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CODEROLE_LOG", "error,coderole=info"))
        .init();

    let matches = build_cli().get_matches();

    let outcome = match matches.subcommand() {
        Some(("preprocess", sub_m)) => handle_preprocess(sub_m),
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("classify", sub_m)) => handle_classify(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = outcome {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn handle_preprocess(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let has_overrides = matches.contains_id("source_dir") || matches.contains_id("dest_dir");
    if config_path.is_none() && !has_overrides {
        return print_config_template("preprocess", &PreprocessConfig::default());
    }

    log::info!("[coderole::preprocess] Using config: {:?}", config_path);
    let config = PreprocessConfig::from_arguments(config_path, matches)?;
    let summary = runner::run_preprocess(&config)?;
    println!(
        "Wrote {} training and {} testing samples to {}",
        summary.training_samples, summary.testing_samples, config.dest_dir
    );
    Ok(())
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config_path: Option<&PathBuf> = matches.get_one("config");
    let has_overrides = matches.contains_id("training_data") || matches.contains_id("testing_data");
    if config_path.is_none() && !has_overrides {
        return print_config_template("train", &TrainConfig::default());
    }

    log::info!("[coderole::train] Training from config: {:?}", config_path);
    let config = TrainConfig::from_arguments(config_path, matches)?;
    trainer::run_training(&config)?;
    Ok(())
}

fn handle_classify(matches: &ArgMatches) -> Result<()> {
    let model_path: &PathBuf = matches
        .get_one("model_path")
        .ok_or_else(|| anyhow::anyhow!("--model is required"))?;
    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    for (file, label) in classify_files(model_path, &files)? {
        println!("{}\t{}", file.display(), label);
    }
    Ok(())
}
