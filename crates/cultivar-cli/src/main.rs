use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use cultivar_classifiers::config::DEFAULT_SEED;

mod commands;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CULTIVAR_LOG", "error,cultivar_classifiers=info,cultivar_cli=info"))
        .init();

    let matches = Command::new("cultivar")
        .version(clap::crate_version!())
        .about("\u{1F33E} Cultivar - Crop recommendation from soil and climate measurements")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("benchmark")
                .about("Evaluate every classifier and the voting ensemble on a crop table")
                .arg(
                    Arg::new("data")
                        .help("Path to the crop CSV file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the metrics report (CSV). Defaults to stdout only.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for splits, folds and tree randomness.")
                        .value_parser(clap::value_parser!(u64))
                        .default_value(default_seed_str())
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Train the ensemble on a crop table and predict one sample")
                .arg(
                    Arg::new("data")
                        .help("Path to the crop CSV file used for training")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .help("Path to a JSON file with one feature sample. Defaults to stdin.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the training split and tree randomness.")
                        .value_parser(clap::value_parser!(u64))
                        .default_value(default_seed_str())
                        .value_hint(ValueHint::Other),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("benchmark", sub_m)) => handle_benchmark(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn default_seed_str() -> String {
    DEFAULT_SEED.to_string()
}

fn handle_benchmark(matches: &ArgMatches) -> Result<()> {
    let data: &PathBuf = matches.get_one("data").unwrap();
    let output: Option<&PathBuf> = matches.get_one("output_file");
    let seed: u64 = *matches.get_one("seed").unwrap();
    log::info!("[Cultivar::Benchmark] Evaluating crop table: {:?}", data);

    match commands::benchmark::run(data, output.map(PathBuf::as_path), seed) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Benchmark failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let data: &PathBuf = matches.get_one("data").unwrap();
    let input: Option<&PathBuf> = matches.get_one("input");
    let seed: u64 = *matches.get_one("seed").unwrap();
    log::info!("[Cultivar::Predict] Training from crop table: {:?}", data);

    match commands::predict::run(data, input.map(PathBuf::as_path), seed) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Prediction failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
