// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and delegates every workflow to Layer 2 (application).
// This layer only routes and prints — it never computes.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use commands::{ClassifyArgs, Commands, ExtractArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "dysarthria-screen",
    version = "0.1.0",
    about = "Extract acoustic features from speech recordings and screen for dysarthria."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Extract(args) => run_extract(args),
            Commands::Train(args) => run_train(args),
            Commands::Classify(args) => run_classify(args),
        }
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    use crate::application::extract_use_case::ExtractUseCase;

    let count = ExtractUseCase::new(&args.input_dir, &args.output).execute()?;
    println!("Extracted {} recordings into '{}'.", count, args.output);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training");
    TrainUseCase::new(args.into()).execute()?;
    println!("Training complete. Snapshot saved.");
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;
    use crate::domain::features::{MFCC_COUNT, SCALAR_COLUMNS};

    let use_case = ClassifyUseCase::new(&args.checkpoint_dir)?;
    let result = use_case.classify(Path::new(&args.wav))?;

    println!("\nFeatures for '{}':", args.wav);
    for (name, value) in SCALAR_COLUMNS.iter().zip(result.bundle.scalar_values()) {
        println!("  {name}: {value:.4}");
    }
    println!("  MFCC Mean: {} coefficients", MFCC_COUNT);

    let reading = if result.is_pathological() {
        "pathological (dysarthric) speech"
    } else {
        "control (healthy) speech"
    };
    println!(
        "\nPrediction: {} — probability {:.4}",
        reading, result.probability
    );
    Ok(())
}
