use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, ValueHint};

/// Argument definitions for the `coderole` binary.
pub fn build_cli() -> Command {
    Command::new("coderole")
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about("coderole CLI - role classification for PHP source files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("preprocess")
                .about("Label, normalize and featurize raw samples into training and testing sets")
                .arg(
                    Arg::new("config")
                        .help("Path to preprocessing configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("source_dir")
                        .short('s')
                        .long("source_dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Directory with raw *.php samples. Overrides the source directory \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("dest_dir")
                        .short('o')
                        .long("dest_dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Directory that receives training.json and testing.json. \
                             Overrides the destination specified in the configuration file.",
                        )
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("test_ratio")
                        .long("test-ratio")
                        .value_parser(clap::value_parser!(f64))
                        .help("Share of samples placed in the testing set (0 to 1)."),
                ),
        )
        .subcommand(
            Command::new("train")
                .about("Train, save, evaluate and cross-validate a classifier")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("training_data")
                        .short('t')
                        .long("training_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the training set (*.json). Overrides the training data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("testing_data")
                        .short('e')
                        .long("testing_data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the testing set (*.json). Overrides the testing data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output_file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help(
                            "File path that the trained model will be written to. \
                             Overrides model_path in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_type")
                        .short('m')
                        .long("model_type")
                        .help(
                            "Backend to train. \
                             Overrides model_type in the configuration file.",
                        )
                        .value_parser(["random_forest", "neural_network", "decision_tree", "svm"])
                        .required(false),
                )
                .arg(
                    Arg::new("folds")
                        .short('f')
                        .long("folds")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of cross-validation folds."),
                )
                .arg(
                    Arg::new("exclude_held_out")
                        .long("exclude-held-out")
                        .help("Train each cross-validation fold without its held-out samples.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("report_file")
                        .long("report")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Write an HTML training report to this path.")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify source files with a trained model")
                .arg(
                    Arg::new("model_path")
                        .short('m')
                        .long("model")
                        .help("Path to the trained model file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("files")
                        .help("Source files to classify")
                        .required(true)
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
}
