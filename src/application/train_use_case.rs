// ============================================================
// Layer 2 — Train Use Case
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Read labeled feature tables   (Layer 4 - data)
//   Step 2: Reconcile vectors to width W  (Layer 4 - data)
//   Step 3: Shuffle + train/val split     (Layer 4 - data)
//   Step 4: Build datasets                (Layer 4 - data)
//   Step 5: Save run configuration        (Layer 6 - infra)
//   Step 6: Run training loop             (Layer 5 - ml)
//
// Two table layouts are accepted, matching how the datasets ship:
// a single combined table with a Label column, or one pathological
// table and one control table (labels 1 and 0 assigned at load).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    dataset::{SpeechDataset, SpeechSample},
    splitter::split_train_val,
    table::{read_labeled_table, LabeledRow},
    vectorizer::FeatureVectorizer,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::SpeechClassifierConfig;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so the run
// can be reconstructed from the checkpoint directory afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Single table carrying a Label column
    pub combined_table: Option<String>,
    /// Table of pathological recordings (label 1)
    pub pathological_table: Option<String>,
    /// Table of control recordings (label 0)
    pub control_table: Option<String>,
    pub checkpoint_dir: String,
    pub input_width: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub num_heads: usize,
    pub dropout: f64,
    pub lr: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub train_fraction: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            combined_table: None,
            pathological_table: None,
            control_table: None,
            checkpoint_dir: "checkpoints".to_string(),
            input_width: 28,
            hidden_size: 128,
            num_layers: 2,
            num_heads: 8,
            dropout: 0.3,
            lr: 1e-3,
            epochs: 10,
            batch_size: 32,
            train_fraction: 0.8,
            seed: 42,
        }
    }
}

impl TrainConfig {
    /// The architecture hyperparameters that key the parameter snapshot.
    pub fn model_config(&self) -> SpeechClassifierConfig {
        SpeechClassifierConfig::new(
            self.input_width,
            self.hidden_size,
            self.num_layers,
            self.num_heads,
            self.dropout,
        )
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Read the labeled tables ───────────────────────────────────
        let rows = load_rows(cfg)?;
        tracing::info!("Loaded {} labeled rows", rows.len());
        if rows.is_empty() {
            bail!("no training rows found in the given tables");
        }

        // ── Step 2: Reconcile every vector to the model input width ───────────
        // A row wider than the configured width is a schema drift and
        // aborts the run here, before any tensor is built.
        let vectorizer = FeatureVectorizer::new(cfg.input_width);
        let samples: Vec<SpeechSample> = rows
            .into_iter()
            .map(|LabeledRow { values, label }| {
                Ok(SpeechSample::new(vectorizer.reconcile(values)?, label))
            })
            .collect::<Result<_>>()?;

        // ── Step 3: Shuffle and split ─────────────────────────────────────────
        let (train_samples, val_samples) =
            split_train_val(samples, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len(),
        );

        // ── Step 4: Build Burn datasets ───────────────────────────────────────
        let train_dataset = SpeechDataset::new(train_samples);
        let val_dataset = SpeechDataset::new(val_samples);

        // ── Step 5: Save the run configuration for provenance ─────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_train_config(cfg)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, val_dataset, ckpt_manager, None)?;
        Ok(())
    }
}

/// Load rows from whichever table layout was configured.
fn load_rows(cfg: &TrainConfig) -> Result<Vec<LabeledRow>> {
    if let Some(combined) = &cfg.combined_table {
        return read_labeled_table(Path::new(combined), None);
    }

    match (&cfg.pathological_table, &cfg.control_table) {
        (Some(path_table), Some(ctrl_table)) => {
            let mut rows = read_labeled_table(Path::new(path_table), Some(1))?;
            rows.extend(read_labeled_table(Path::new(ctrl_table), Some(0))?);
            Ok(rows)
        }
        _ => bail!(
            "either a combined table with a Label column, or both a \
             pathological table and a control table, must be given"
        ),
    }
}
