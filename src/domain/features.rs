// ============================================================
// Layer 3 — Acoustic Feature Schema
// ============================================================
// One FeatureBundle is produced per processed waveform.
//
// The vectorization order is declared HERE, once, as constants:
// scalar features in SCALAR_COLUMNS order, then the 20 MFCC
// coefficients in index order. The extractor fills a struct
// (so a bundle is complete or absent, never partial), and the
// vectorizer and the feature table both derive their column
// layout from these constants. Reordering a field without
// updating the schema is impossible to do silently — table
// read-back validates headers against `table_columns()`.

use serde::{Deserialize, Serialize};

/// Number of mel-frequency cepstral coefficients kept per recording.
pub const MFCC_COUNT: usize = 20;

/// Scalar feature columns, in vectorization order.
/// MFCC coefficients always follow these.
pub const SCALAR_COLUMNS: [&str; 7] = [
    "Duration (s)",
    "RMS Energy",
    "ZCR (Zero Crossing Rate)",
    "Spectral Centroid",
    "Spectral Bandwidth",
    "Spectral Rolloff",
    "Pitch (Fundamental Frequency)",
];

/// Label column name used in combined training tables.
pub const LABEL_COLUMN: &str = "Label";

/// All feature columns of the on-disk table: the scalars followed by
/// MFCC_1..MFCC_20. The demographic placeholder is deliberately absent.
pub fn table_columns() -> Vec<String> {
    let mut cols: Vec<String> = SCALAR_COLUMNS.iter().map(|s| s.to_string()).collect();
    for i in 1..=MFCC_COUNT {
        cols.push(format!("MFCC_{i}"));
    }
    cols
}

/// Every acoustic quantity computed from one waveform.
///
/// The `gender` field is a fixed categorical placeholder kept for dataset
/// provenance only. It is stripped before vectorization and never reaches
/// the model or the feature table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureBundle {
    pub gender: String,
    pub duration_s: f32,
    pub rms_energy: f32,
    pub zero_crossing_rate: f32,
    pub spectral_centroid: f32,
    pub spectral_bandwidth: f32,
    pub spectral_rolloff: f32,
    pub pitch_hz: f32,
    pub mfcc_mean: [f32; MFCC_COUNT],
}

impl FeatureBundle {
    /// Scalar feature values in SCALAR_COLUMNS order.
    pub fn scalar_values(&self) -> [f32; SCALAR_COLUMNS.len()] {
        [
            self.duration_s,
            self.rms_energy,
            self.zero_crossing_rate,
            self.spectral_centroid,
            self.spectral_bandwidth,
            self.spectral_rolloff,
            self.pitch_hz,
        ]
    }

    /// All numeric feature values in vectorization order
    /// (scalars first, then MFCCs). The placeholder is excluded.
    pub fn values(&self) -> Vec<f32> {
        let mut v = self.scalar_values().to_vec();
        v.extend_from_slice(&self.mfcc_mean);
        v
    }

    /// True when every numeric value is finite. A bundle failing this
    /// check must be discarded by the extractor, never emitted.
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|x| x.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> FeatureBundle {
        FeatureBundle {
            gender: "Male".into(),
            duration_s: 2.0,
            rms_energy: 0.1,
            zero_crossing_rate: 0.05,
            spectral_centroid: 1200.0,
            spectral_bandwidth: 800.0,
            spectral_rolloff: 2400.0,
            pitch_hz: 180.0,
            mfcc_mean: [0.5; MFCC_COUNT],
        }
    }

    #[test]
    fn values_follow_schema_order() {
        let v = bundle().values();
        assert_eq!(v.len(), SCALAR_COLUMNS.len() + MFCC_COUNT);
        assert_eq!(v[0], 2.0); // Duration (s)
        assert_eq!(v[6], 180.0); // Pitch is the last scalar
        assert_eq!(v[7], 0.5); // MFCC_1 follows the scalars
    }

    #[test]
    fn table_columns_expand_mfccs() {
        let cols = table_columns();
        assert_eq!(cols.len(), 27);
        assert_eq!(cols[0], "Duration (s)");
        assert_eq!(cols[7], "MFCC_1");
        assert_eq!(cols[26], "MFCC_20");
    }

    #[test]
    fn non_finite_value_is_detected() {
        let mut b = bundle();
        assert!(b.is_finite());
        b.mfcc_mean[3] = f32::NAN;
        assert!(!b.is_finite());
    }
}
