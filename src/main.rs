use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use polars::prelude::DataFrame;
use talent_flow_predictor::{
    conf::Settings, prepare, train_test_split, write_table, Locator, PreparedData,
};

// Data preparation entry point
// Steps
// 1. Resolve settings (config file + TALENT_FLOW_* env)
// 2. Load raw listings from a file, URL or S3 object
// 3. Clean, engineer features and select the feature columns
// 4. Write the engineered table, or a train/test split of it

#[derive(Parser, Debug)]
#[command(name = "talent-flow")]
#[command(version = talent_flow_predictor::VERSION)]
#[command(about = "Prepares job listings for salary prediction", long_about = None)]
struct Cli {
    /// Config file (JSON, TOML or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raw listings locator, overrides the configured one
    #[arg(short, long, global = true)]
    input: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean and engineer the listings, then write the full engineered table
    Prepare {
        /// Output path or s3://bucket/key (.parquet or .csv), defaults to the
        /// configured destination
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Prepare the listings and write shuffled train and test tables
    Split {
        /// Train features and target, path or s3://bucket/key
        #[arg(long)]
        train_out: String,

        /// Test features and target, path or s3://bucket/key
        #[arg(long)]
        test_out: String,

        /// Fraction of rows held out for testing
        #[arg(long)]
        test_size: Option<f64>,

        /// Shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // 1. Resolve settings
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    // 2. + 3. Load and prepare
    let locator: Locator = match &cli.input {
        Some(input) => input.parse()?,
        None => settings.locator()?,
    };
    let manifest = settings.manifest();
    let prepared = prepare(&locator, &manifest, &settings.options())
        .with_context(|| format!("Failed to prepare listings from {locator:?}"))?;

    info!("Prepared {} rows", prepared.len());
    info!("Features used: {:?}", prepared.used_features);
    if !prepared.has_target() {
        warn!("No salary_value column, there is no target");
    }

    // 4. Persist
    match cli.command {
        Command::Prepare { output } => {
            let dest: Locator = match output {
                Some(output) => output.parse()?,
                None => settings.destination()?,
            };
            let mut table = prepared.table;
            write_to(&mut table, &dest)?;
        }
        Command::Split {
            train_out,
            test_out,
            test_size,
            seed,
        } => {
            let test_size = test_size.unwrap_or(settings.test_size);
            let seed = seed.unwrap_or(settings.seed);
            let (train, test) = train_test_split(&prepared, test_size, seed)?;
            info!("Split into {} train and {} test rows", train.len(), test.len());
            write_training_set(train, &train_out.parse()?)?;
            write_training_set(test, &test_out.parse()?)?;
        }
    }

    Ok(())
}

fn write_training_set(prepared: PreparedData, dest: &Locator) -> Result<()> {
    let PreparedData {
        mut features,
        target,
        ..
    } = prepared;
    if let Some(target) = target {
        features.with_column(target)?;
    }
    write_to(&mut features, dest)
}

fn write_to(df: &mut DataFrame, dest: &Locator) -> Result<()> {
    write_table(df, dest).with_context(|| format!("Failed to write {dest:?}"))?;
    Ok(())
}
