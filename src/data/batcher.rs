// ============================================================
// Layer 4 — Speech Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SpeechSample>
// into tensors for the model's forward pass.
//
// Input:  Vec of N samples, each with a feature vector of width W
// Output: SpeechBatch with features [N, W] and labels [N]
//
// All feature vectors were reconciled to the same width by the
// vectorizer before they reached the dataset, so stacking is a
// flatten-then-reshape.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::SpeechSample;

/// A batch of labeled feature vectors ready for the model.
#[derive(Debug, Clone)]
pub struct SpeechBatch<B: Backend> {
    /// Feature vectors — shape: [batch_size, input_width]
    pub features: Tensor<B, 2>,

    /// Condition labels (0 or 1) — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created in the right place.
#[derive(Clone, Debug)]
pub struct SpeechBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SpeechBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SpeechSample, SpeechBatch<B>> for SpeechBatcher<B> {
    fn batch(&self, items: Vec<SpeechSample>) -> SpeechBatch<B> {
        // The DataLoader never emits an empty batch
        debug_assert!(!items.is_empty(), "cannot batch zero samples");
        let batch_size = items.len();
        // Every vector left the vectorizer at the same width
        let width = items[0].features.len();

        let flat: Vec<f32> = items.iter().flat_map(|s| s.features.iter().copied()).collect();
        let labels: Vec<i32> = items.iter().map(|s| s.label).collect();

        let features = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, width]);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SpeechBatch { features, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::EvalBackend;

    #[test]
    fn stacks_samples_into_matching_tensor_shapes() {
        let batcher = SpeechBatcher::<EvalBackend>::new(Default::default());
        let batch = batcher.batch(vec![
            SpeechSample::new(vec![0.1, 0.2, 0.3], 0),
            SpeechSample::new(vec![0.4, 0.5, 0.6], 1),
        ]);

        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);
        let labels: Vec<i64> = batch.labels.into_data().to_vec().unwrap();
        assert_eq!(labels, vec![0, 1]);
    }
}
