//! Command line argument parsing for the Verity CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verity - fake news classification from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "verity")]
#[command(about = "Classify news text as fake or true with a TF-IDF logistic regression model")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct VerityArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, env = "VERITY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact path, overriding the configuration
    #[arg(short, long, env = "VERITY_MODEL_PATH", global = true)]
    pub model: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl VerityArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Log level requested on the command line.
    ///
    /// `None` means no flag was given and `VERITY_LOG` (or the warn default)
    /// decides. `-q` wins over `-v`.
    pub fn log_filter(&self) -> Option<LevelFilter> {
        if self.quiet {
            return Some(LevelFilter::Error);
        }
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify text
    Predict(PredictArgs),

    /// Train a model and write the artifact
    Train(TrainArgs),

    /// Show model information
    Info,

    /// List sample headlines
    Samples(SamplesArgs),

    /// Report service health
    Health,
}

/// Arguments for predicting
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Text to classify
    #[arg(value_name = "TEXT", conflicts_with_all = ["stdin", "file"])]
    pub text: Option<String>,

    /// Read a single text from standard input
    #[arg(long, conflicts_with = "file")]
    pub stdin: bool,

    /// Classify every line of a file
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Also print the normalized text
    #[arg(long)]
    pub show_normalized: bool,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// CSV file of fake news with a `text` column
    #[arg(long, value_name = "CSV", requires = "true_csv")]
    pub fake_csv: Option<PathBuf>,

    /// CSV file of true news with a `text` column
    #[arg(long, value_name = "CSV", requires = "fake_csv")]
    pub true_csv: Option<PathBuf>,

    /// JSON lines corpus of `{text, label}` objects
    #[arg(long, value_name = "JSONL", conflicts_with_all = ["fake_csv", "true_csv"])]
    pub jsonl: Option<PathBuf>,

    /// Where to write the artifact (defaults to the configured model path)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Random seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for listing samples
#[derive(Parser, Debug, Clone)]
pub struct SamplesArgs {
    /// Only samples with this label
    #[arg(short, long)]
    pub label: Option<SampleLabelArg>,

    /// Maximum number of samples per label
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Pick one sample at random
    #[arg(long)]
    pub random: bool,

    /// Samples file, overriding the configuration
    #[arg(long, value_name = "JSON")]
    pub file: Option<PathBuf>,
}

/// Sample label filter
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleLabelArg {
    Fake,
    True,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
