// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model parameters with a full-precision mpk
// recorder. Full precision matters: a reloaded model must produce
// bit-identical logits to the model that was saved, and any
// half-precision recorder would quantize the weights on the way out.
//
// What gets saved per training run:
//   1. model_epoch_{n}.mpk    — all learned parameters after epoch n
//   2. latest_epoch.json      — which epoch was last saved
//   3. model_config.json      — the architecture hyperparameters
//                               (input width, hidden width, layer
//                               count, head count) that key the
//                               snapshot
//   4. train_config.json      — the full training configuration,
//                               kept for provenance
//
// A snapshot only makes sense against the exact architecture it
// was recorded from, so load_model compares the requested
// hyperparameters with the saved ones and refuses a mismatch
// before touching the weight file. Snapshots are never mutated
// after writing; loading is read-only.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::{fs, path::PathBuf};

use crate::domain::errors::ScreenError;
use crate::ml::model::{SpeechClassifier, SpeechClassifierConfig};

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`, creating it if needed.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Record the model parameters after `epoch` and update the
    /// latest-epoch pointer.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &SpeechClassifier<B>,
        epoch: usize,
    ) -> Result<()> {
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("failed to save snapshot to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "failed to write latest_epoch.json")?;

        tracing::debug!("Saved snapshot for epoch {}", epoch);
        Ok(())
    }

    /// Load the latest snapshot into `model`.
    ///
    /// `expected` must match the hyperparameters recorded at save time;
    /// a mismatched architecture fails with ParameterShapeMismatch
    /// before the weight file is read.
    pub fn load_model<B: Backend>(
        &self,
        model: SpeechClassifier<B>,
        expected: &SpeechClassifierConfig,
        device: &B::Device,
    ) -> Result<SpeechClassifier<B>> {
        let saved = self.load_model_config()?;
        if !saved.same_shape(expected) {
            return Err(ScreenError::ParameterShapeMismatch(format!(
                "snapshot was recorded with [{}] but the model was built with [{}]",
                saved.shape_key(),
                expected.shape_key(),
            ))
            .into());
        }

        let epoch = self.latest_epoch()?;
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading snapshot from epoch {}", epoch);

        let record = NamedMpkFileRecorder::<FullPrecisionSettings>::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "cannot load snapshot '{}' — has training been run?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Persist the architecture hyperparameters that key this snapshot.
    /// Must be called before the first save_model of a run.
    pub fn save_model_config(&self, cfg: &SpeechClassifierConfig) -> Result<()> {
        let path = self.dir.join("model_config.json");
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("cannot write model config to '{}'", path.display()))?;
        Ok(())
    }

    /// Read back the architecture hyperparameters of the stored snapshot.
    pub fn load_model_config(&self) -> Result<SpeechClassifierConfig> {
        let path = self.dir.join("model_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "cannot read model config from '{}' — has training been run?",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Persist the full training configuration for provenance.
    pub fn save_train_config<C: serde::Serialize>(&self, cfg: &C) -> Result<()> {
        let path = self.dir.join("train_config.json");
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("cannot write train config to '{}'", path.display()))?;
        Ok(())
    }

    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| "cannot find 'latest_epoch.json' — has training been run?")?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{EvalBackend, TrainBackend};
    use burn::module::AutodiffModule;

    fn fixed_input(device: &<EvalBackend as Backend>::Device) -> Tensor<EvalBackend, 2> {
        let values: Vec<f32> = (0..28).map(|i| (i as f32 * 0.13).cos()).collect();
        Tensor::<EvalBackend, 1>::from_floats(values.as_slice(), device).reshape([1, 28])
    }

    #[test]
    fn snapshot_round_trip_reproduces_identical_logits() {
        let _rng = crate::ml::test_support::rng_lock();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());
        let device = Default::default();

        let cfg = SpeechClassifierConfig::new(28, 8, 1, 2, 0.0);
        let model: SpeechClassifier<TrainBackend> = cfg.init(&device);
        ckpt.save_model_config(&cfg).unwrap();
        ckpt.save_model(&model, 1).unwrap();

        let reference = model.valid();
        let loaded: SpeechClassifier<EvalBackend> = ckpt
            .load_model(cfg.init(&device), &cfg, &device)
            .unwrap();

        let input = fixed_input(&device);
        let before: Vec<f32> = reference.forward(input.clone()).into_data().to_vec().unwrap();
        let after: Vec<f32> = loaded.forward(input).into_data().to_vec().unwrap();
        // Bit-identical, not merely close
        assert_eq!(before, after);
    }

    #[test]
    fn mismatched_hyperparameters_are_rejected_at_load() {
        let _rng = crate::ml::test_support::rng_lock();
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());
        let device = Default::default();

        let saved_cfg = SpeechClassifierConfig::new(28, 8, 1, 2, 0.0);
        let model: SpeechClassifier<TrainBackend> = saved_cfg.init(&device);
        ckpt.save_model_config(&saved_cfg).unwrap();
        ckpt.save_model(&model, 1).unwrap();

        // Same input width, different hidden width
        let other_cfg = SpeechClassifierConfig::new(28, 16, 1, 2, 0.0);
        let err = ckpt
            .load_model::<EvalBackend>(other_cfg.init(&device), &other_cfg, &device)
            .unwrap_err();
        let screen = err.downcast_ref::<ScreenError>().unwrap();
        assert!(matches!(screen, ScreenError::ParameterShapeMismatch(_)));
    }
}
