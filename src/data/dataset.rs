use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One labeled training example: a feature vector already reconciled
/// to the model's input width, and its binary condition label
/// (0 = control/healthy, 1 = pathological). Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSample {
    pub features: Vec<f32>,
    pub label: i32,
}

impl SpeechSample {
    pub fn new(features: Vec<f32>, label: i32) -> Self {
        Self { features, label }
    }
}

pub struct SpeechDataset {
    samples: Vec<SpeechSample>,
}

impl SpeechDataset {
    pub fn new(samples: Vec<SpeechSample>) -> Self {
        Self { samples }
    }
}

impl Dataset<SpeechSample> for SpeechDataset {
    fn get(&self, index: usize) -> Option<SpeechSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
