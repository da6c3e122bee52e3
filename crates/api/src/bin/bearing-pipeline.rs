//! Bearing Pipeline CLI
//!
//! Offline featurize and train stages for one bearing at a time. Feature
//! settings come from the same TOML file and `BEARING__*` variables the
//! service reads, so both compute identical features.

use anomaly_scorer::{ScorerConfig, DEFAULT_MIN_ACCURACY};
use api::{init_logging, pipeline, ServiceConfig};
use clap::{Parser, Subcommand};
use feature_engine::DEFAULT_VAL_FRACTION;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "bearing-pipeline")]
#[command(version)]
#[command(
    about = "Featurize bearing vibration captures and train health models",
    long_about = None
)]
struct Cli {
    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Service TOML file whose `[features]` table configures featurization
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build feature tables from a directory of raw captures
    Featurize {
        /// Directory of capture files named YYYY.MM.DD.HH.MM.SS
        #[arg(long)]
        data_dir: PathBuf,

        /// 1-based sensor column to read
        #[arg(long)]
        bearing: usize,

        /// Rows in the training prefix (train plus validation)
        #[arg(long)]
        train_size: usize,

        /// Share of the training prefix held out for validation
        #[arg(long, default_value_t = DEFAULT_VAL_FRACTION)]
        val_fraction: f64,

        /// Where feature tables are written
        #[arg(long, default_value = "artifacts/data/processed")]
        out_dir: PathBuf,

        /// Capture sampling rate in Hz, overriding the configured one
        #[arg(long)]
        sampling_rate: Option<u32>,
    },

    /// Fit and gate a model on previously written feature tables
    Train {
        /// 1-based bearing number
        #[arg(long)]
        bearing: usize,

        /// Directory holding the feature tables
        #[arg(long, default_value = "artifacts/data/processed")]
        data_dir: PathBuf,

        /// Where the model file is written
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,

        /// Validation accuracy a model must reach to be saved
        #[arg(long, default_value_t = DEFAULT_MIN_ACCURACY)]
        min_accuracy: f64,
    },
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Featurize {
            data_dir,
            bearing,
            train_size,
            val_fraction,
            out_dir,
            sampling_rate,
        } => {
            let mut config = ServiceConfig::load(cli.config.as_deref())?.features;
            if let Some(rate) = sampling_rate {
                config.sampling_rate = rate;
            }
            let summary = pipeline::featurize(
                &config,
                &data_dir,
                bearing,
                train_size,
                val_fraction,
                &out_dir,
            )?;
            println!(
                "Wrote {} rows for bearing {} to {} ({} train, {} validation, {} test)",
                summary.rows,
                bearing,
                out_dir.display(),
                summary.train,
                summary.validation,
                summary.test
            );
        }
        Commands::Train {
            bearing,
            data_dir,
            model_dir,
            min_accuracy,
        } => {
            let config = ScorerConfig {
                min_accuracy,
                ..Default::default()
            };
            let summary = pipeline::train(config, &data_dir, &model_dir, bearing)?;
            println!(
                "Model accuracy {:.3}; saved {} and {} ({} faulty rows)",
                summary.accuracy,
                summary.model_path.display(),
                summary.predictions_path.display(),
                summary.faulty
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging("info", cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
