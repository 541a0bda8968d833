// ============================================================
// Layer 5 — Inference Adapter
// ============================================================
// Loads a parameter snapshot, reconciles an extracted feature
// vector to the trained input width, and produces a sigmoid
// probability. Probability > 0.5 reads as pathological speech.
//
// The width reconciliation happens BEFORE any forward pass: a
// vector already wider than the trained width means the feature
// contract drifted since training, and the adapter refuses it
// instead of guessing.

use anyhow::Result;
use burn::prelude::*;
use burn::tensor::activation::sigmoid;
use std::path::Path;

use crate::audio::extractor::FeatureExtractor;
use crate::data::vectorizer::FeatureVectorizer;
use crate::domain::errors::ScreenError;
use crate::domain::features::FeatureBundle;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::SpeechClassifier;
use crate::ml::{Device, EvalBackend};

pub struct Inferencer {
    model: SpeechClassifier<EvalBackend>,
    vectorizer: FeatureVectorizer,
    extractor: FeatureExtractor,
    device: Device,
}

impl Inferencer {
    /// Rebuild the trained model from a snapshot directory.
    /// The architecture comes from the saved hyperparameters; dropout
    /// is irrelevant on the eval backend and set to zero.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = Device::default();
        let mut cfg = ckpt_manager.load_model_config()?;
        cfg.dropout = 0.0;
        let model: SpeechClassifier<EvalBackend> = cfg.init(&device);
        let model = ckpt_manager.load_model(model, &cfg, &device)?;
        tracing::info!("Model loaded from snapshot ({})", cfg.shape_key());

        Ok(Self {
            model,
            vectorizer: FeatureVectorizer::new(cfg.input_width),
            extractor: FeatureExtractor::new(),
            device,
        })
    }

    /// Classify one recording: extract features, drop the demographic
    /// placeholder, vectorize, forward, sigmoid. Extraction failure is
    /// fatal here — there is no batch to skip within.
    pub fn classify_file(&self, wav_path: &Path) -> Result<(FeatureBundle, f32)> {
        let bundle = self.extractor.extract(wav_path)?;
        let probability = self.predict_vector(bundle.values())?;
        tracing::debug!(
            "'{}' → probability {:.4}",
            wav_path.display(),
            probability
        );
        Ok((bundle, probability))
    }

    /// Run a raw (pre-padding) feature vector through the model.
    /// Pads short vectors to the trained width; rejects overlong ones
    /// with SchemaMismatch before any forward pass.
    pub fn predict_vector(&self, values: Vec<f32>) -> Result<f32, ScreenError> {
        let features = self.vectorizer.reconcile(values)?;

        let input = Tensor::<EvalBackend, 1>::from_floats(features.as_slice(), &self.device)
            .unsqueeze::<2>();
        let logit = self.model.forward(input);
        let probability: f32 = sigmoid(logit).into_scalar().elem::<f32>();
        Ok(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SpeechClassifierConfig;
    use crate::ml::TrainBackend;

    /// Write a fresh snapshot with W=28 and build an Inferencer on it.
    fn inferencer_with_width_28(dir: &Path) -> Inferencer {
        let ckpt = CheckpointManager::new(dir.to_str().unwrap());
        let device = Default::default();
        let cfg = SpeechClassifierConfig::new(28, 8, 1, 2, 0.0);
        let model: SpeechClassifier<TrainBackend> = cfg.init(&device);
        ckpt.save_model_config(&cfg).unwrap();
        ckpt.save_model(&model, 1).unwrap();
        Inferencer::from_checkpoint(&ckpt).unwrap()
    }

    #[test]
    fn short_vector_is_padded_and_classified() {
        let _rng = crate::ml::test_support::rng_lock();
        let dir = tempfile::tempdir().unwrap();
        let inferencer = inferencer_with_width_28(dir.path());

        // 27 extracted values against W=28 — padded, then classified
        let prob = inferencer.predict_vector(vec![0.1; 27]).unwrap();
        assert!((0.0..=1.0).contains(&prob));
    }

    #[test]
    fn prepadded_overlong_vector_is_rejected_before_forward() {
        let _rng = crate::ml::test_support::rng_lock();
        let dir = tempfile::tempdir().unwrap();
        let inferencer = inferencer_with_width_28(dir.path());

        let err = inferencer.predict_vector(vec![0.0; 30]).unwrap_err();
        match err {
            ScreenError::SchemaMismatch { detail } => {
                assert!(detail.contains("30"));
                assert!(detail.contains("28"));
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn classify_file_returns_bundle_and_probability() {
        use std::f32::consts::PI;

        let _rng = crate::ml::test_support::rng_lock();
        let dir = tempfile::tempdir().unwrap();
        let inferencer = inferencer_with_width_28(dir.path());

        let wav_path = dir.path().join("sample.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
        for i in 0..16000 {
            let v = (2.0 * PI * 180.0 * i as f32 / 16000.0).sin() * 0.4;
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let (bundle, prob) = inferencer.classify_file(&wav_path).unwrap();
        assert!(bundle.is_finite());
        assert!((0.0..=1.0).contains(&prob));
    }
}
