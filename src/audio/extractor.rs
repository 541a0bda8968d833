// ============================================================
// Layer 4 — Feature Extractor
// ============================================================
// Turns one waveform file into a complete FeatureBundle, or an
// ExtractionFailure. The bundle is assembled in full before it
// is returned: an unreadable file, zero-length audio, or any
// non-finite computed value yields no bundle at all.
//
// In batch mode the caller logs the failure and skips the file;
// in single-file inference the failure is fatal.

use std::path::Path;

use crate::audio::dsp::SpectrumAnalyzer;
use crate::audio::pitch;
use crate::audio::wave;
use crate::domain::errors::ScreenError;
use crate::domain::features::FeatureBundle;

/// Fixed demographic placeholder recorded for dataset provenance.
/// Stripped before vectorization; never reaches the model.
const GENDER_PLACEHOLDER: &str = "Male";

/// Extracts acoustic features from waveform files.
/// Holds the FFT front end so repeated extractions reuse the plan.
pub struct FeatureExtractor {
    analyzer: SpectrumAnalyzer,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self { analyzer: SpectrumAnalyzer::new() }
    }

    /// Extract the full feature set from one WAV file.
    pub fn extract(&self, path: &Path) -> Result<FeatureBundle, ScreenError> {
        let wave = wave::load_wav(path)?;
        let samples = &wave.samples;
        let sr = wave.sample_rate;

        let stats = self.analyzer.spectral_stats(samples, sr);

        let bundle = FeatureBundle {
            gender: GENDER_PLACEHOLDER.to_string(),
            duration_s: wave.duration_s(),
            rms_energy: crate::audio::dsp::mean_rms(samples),
            zero_crossing_rate: crate::audio::dsp::mean_zcr(samples),
            spectral_centroid: stats.centroid,
            spectral_bandwidth: stats.bandwidth,
            spectral_rolloff: stats.rolloff,
            pitch_hz: pitch::mean_f0(samples, sr),
            mfcc_mean: self.analyzer.mfcc_means(samples, sr),
        };

        // A bundle is complete or absent — a single non-finite value
        // invalidates the whole extraction.
        if !bundle.is_finite() {
            return Err(ScreenError::extraction(
                path.display().to_string(),
                "computed a non-finite feature value",
            ));
        }

        Ok(bundle)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::pitch::{PITCH_FMAX, PITCH_FMIN};
    use std::f32::consts::PI;
    use std::path::PathBuf;

    fn write_sine(dir: &Path, name: &str, freq: f32, seconds: f32, sample_rate: u32) -> PathBuf {
        let path = dir.join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        let n = (seconds * sample_rate as f32) as usize;
        for i in 0..n {
            let t = i as f32 / sample_rate as f32;
            let v = (2.0 * PI * freq * t).sin() * 0.5;
            writer.write_sample((v * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn two_second_sine_yields_a_complete_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sine(dir.path(), "tone.wav", 220.0, 2.0, 22050);

        let bundle = FeatureExtractor::new().extract(&path).unwrap();

        assert!((bundle.duration_s - 2.0).abs() < 0.05);
        assert!((PITCH_FMIN..=PITCH_FMAX).contains(&bundle.pitch_hz));
        assert!(bundle.is_finite());
        assert_eq!(bundle.gender, "Male");
        assert!(bundle.rms_energy > 0.0);
        assert!(bundle.spectral_centroid > 0.0);
    }

    #[test]
    fn unreadable_file_fails_without_a_bundle() {
        let err = FeatureExtractor::new()
            .extract(Path::new("/definitely/missing.wav"))
            .unwrap_err();
        assert!(matches!(err, ScreenError::ExtractionFailure { .. }));
    }

    #[test]
    fn corrupt_wav_is_skippable_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.wav");
        std::fs::write(&path, b"not a riff header at all").unwrap();
        let err = FeatureExtractor::new().extract(&path).unwrap_err();
        assert!(matches!(err, ScreenError::ExtractionFailure { .. }));
    }
}
