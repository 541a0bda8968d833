// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands — `extract`, `train`, and
// `classify` — and all their configurable flags.
//
// clap's derive macros generate help text, missing-argument
// errors, and string → number conversion.

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract acoustic features from a directory of .wav files
    Extract(ExtractArgs),

    /// Train the classifier on labeled feature tables
    Train(TrainArgs),

    /// Classify a single recording using a trained snapshot
    Classify(ClassifyArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory to walk (recursively) for .wav files
    #[arg(long)]
    pub input_dir: String,

    /// Where to write the feature table CSV
    #[arg(long, default_value = "features.csv")]
    pub output: String,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Combined feature table with a trailing Label column
    #[arg(long, conflicts_with_all = ["pathological_table", "control_table"])]
    pub table: Option<String>,

    /// Feature table of pathological recordings (assigned label 1)
    #[arg(long, requires = "control_table")]
    pub pathological_table: Option<String>,

    /// Feature table of control recordings (assigned label 0)
    #[arg(long, requires = "pathological_table")]
    pub control_table: Option<String>,

    /// Directory for snapshots, configs, and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Model input width W — feature vectors are zero-padded up to
    /// this width and rejected above it
    #[arg(long, default_value_t = 28)]
    pub input_width: usize,

    /// Hidden width of each recurrent direction
    #[arg(long, default_value_t = 128)]
    pub hidden_size: usize,

    /// Stacked layers per bidirectional recurrent block
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Attention heads in the front end
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Dropout probability between the recurrent blocks
    #[arg(long, default_value_t = 0.3)]
    pub dropout: f64,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Number of full passes over the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Examples per mini-batch
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Fraction of examples used for training (rest validate)
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for shuffling, splitting, and parameter initialization
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            combined_table: a.table,
            pathological_table: a.pathological_table,
            control_table: a.control_table,
            checkpoint_dir: a.checkpoint_dir,
            input_width: a.input_width,
            hidden_size: a.hidden_size,
            num_layers: a.num_layers,
            num_heads: a.num_heads,
            dropout: a.dropout,
            lr: a.lr,
            epochs: a.epochs,
            batch_size: a.batch_size,
            train_fraction: a.train_fraction,
            seed: a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The .wav recording to classify
    #[arg(long)]
    pub wav: String,

    /// Directory where snapshots were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
