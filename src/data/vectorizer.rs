// ============================================================
// Layer 4 — Feature Vectorizer
// ============================================================
// Flattens a FeatureBundle into the model's input vector of
// exactly `input_width` values: the scalar features in schema
// order, then the 20 MFCC coefficients in index order.
//
// Padding is asymmetric on purpose. A vector shorter than the
// configured width is zero-padded on the right — the extra
// columns are reserved capacity. A vector LONGER than the width
// means the extractor and the model disagree about the feature
// contract, which is a schema drift; it fails loudly and is
// never truncated.

use crate::domain::errors::ScreenError;
use crate::domain::features::FeatureBundle;

/// Reconciles feature bundles to the model's configured input width.
#[derive(Debug, Clone, Copy)]
pub struct FeatureVectorizer {
    input_width: usize,
}

impl FeatureVectorizer {
    pub fn new(input_width: usize) -> Self {
        Self { input_width }
    }

    /// Flatten one bundle into a vector of exactly `input_width` values.
    /// The demographic placeholder is excluded by construction —
    /// `FeatureBundle::values` never emits it.
    pub fn vectorize(&self, bundle: &FeatureBundle) -> Result<Vec<f32>, ScreenError> {
        self.reconcile(bundle.values())
    }

    /// Pad a raw feature vector to `input_width`, or reject it if it
    /// is already wider. Used both for bundles and for vectors read
    /// back from a feature table.
    pub fn reconcile(&self, mut values: Vec<f32>) -> Result<Vec<f32>, ScreenError> {
        if values.len() > self.input_width {
            return Err(ScreenError::schema(format!(
                "feature vector has {} values but the model input width is {}",
                values.len(),
                self.input_width,
            )));
        }
        values.resize(self.input_width, 0.0);
        Ok(values)
    }

    /// Vectorize a batch of bundles. Bundles share a single statically
    /// declared schema, so only the width contract can fail here; any
    /// failure aborts the whole batch.
    pub fn vectorize_batch(&self, bundles: &[FeatureBundle]) -> Result<Vec<Vec<f32>>, ScreenError> {
        bundles.iter().map(|b| self.vectorize(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::MFCC_COUNT;

    fn bundle() -> FeatureBundle {
        FeatureBundle {
            gender: "Male".into(),
            duration_s: 1.5,
            rms_energy: 0.2,
            zero_crossing_rate: 0.1,
            spectral_centroid: 1000.0,
            spectral_bandwidth: 500.0,
            spectral_rolloff: 2000.0,
            pitch_hz: 150.0,
            mfcc_mean: [1.0; MFCC_COUNT],
        }
    }

    #[test]
    fn pads_short_vector_with_zeros_on_the_right() {
        // 27 features reconciled to width 28
        let v = FeatureVectorizer::new(28).vectorize(&bundle()).unwrap();
        assert_eq!(v.len(), 28);
        assert_eq!(v[26], 1.0); // last MFCC
        assert_eq!(v[27], 0.0); // pad
    }

    #[test]
    fn exact_width_needs_no_padding() {
        let v = FeatureVectorizer::new(27).vectorize(&bundle()).unwrap();
        assert_eq!(v.len(), 27);
        assert!(v.iter().all(|&x| x != 0.0));
    }

    #[test]
    fn overlong_vector_is_rejected_not_truncated() {
        let err = FeatureVectorizer::new(20).vectorize(&bundle()).unwrap_err();
        match err {
            ScreenError::SchemaMismatch { detail } => {
                assert!(detail.contains("27"));
                assert!(detail.contains("20"));
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn batch_of_three_pads_every_vector_identically() {
        let bundles = vec![bundle(), bundle(), bundle()];
        let batch = FeatureVectorizer::new(28).vectorize_batch(&bundles).unwrap();
        assert_eq!(batch.len(), 3);
        for v in &batch {
            assert_eq!(v.len(), 28);
            assert_eq!(v[27], 0.0);
        }
    }

    #[test]
    fn scenario_three_bundles_of_25_values_at_width_28() {
        // Raw 25-value rows padded to 28: indices 25..27 must be zero
        let vectorizer = FeatureVectorizer::new(28);
        for _ in 0..3 {
            let v = vectorizer.reconcile(vec![1.0; 25]).unwrap();
            assert_eq!(v.len(), 28);
            assert_eq!(&v[25..], &[0.0, 0.0, 0.0]);
        }
    }
}
