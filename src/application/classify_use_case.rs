// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Loads the trained snapshot once and classifies a single
// recording. Extraction failure is fatal here — unlike batch
// extraction, there is nothing to skip to.

use anyhow::Result;
use std::path::Path;

use crate::domain::features::FeatureBundle;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::Inferencer;

/// Decision threshold on the sigmoid probability.
pub const DECISION_THRESHOLD: f32 = 0.5;

pub struct ClassifyUseCase {
    inferencer: Inferencer,
}

/// The outcome handed to the presentation layer.
#[derive(Debug)]
pub struct Classification {
    pub bundle: FeatureBundle,
    pub probability: f32,
}

impl Classification {
    pub fn is_pathological(&self) -> bool {
        self.probability > DECISION_THRESHOLD
    }
}

impl ClassifyUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt = CheckpointManager::new(checkpoint_dir);
        let inferencer = Inferencer::from_checkpoint(&ckpt)?;
        Ok(Self { inferencer })
    }

    pub fn classify(&self, wav_path: &Path) -> Result<Classification> {
        let (bundle, probability) = self.inferencer.classify_file(wav_path)?;
        Ok(Classification { bundle, probability })
    }
}
