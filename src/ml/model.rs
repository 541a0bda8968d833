use burn::{
    nn::{
        BatchNorm, BatchNormConfig,
        BiLstm, BiLstmConfig,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SpeechClassifierConfig {
    /// Width W of one feature vector — the extractor/model contract
    pub input_width: usize,
    /// Hidden width of each recurrent direction
    pub hidden_size: usize,
    /// Stacked layers inside each bidirectional recurrent block
    pub num_layers: usize,
    /// Independent attention heads; the first recurrent block's
    /// declared input width is input_width * num_heads
    pub num_heads: usize,
    pub dropout: f64,
}

impl SpeechClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SpeechClassifier<B> {
        let attention = MultiHeadAttentionConfig {
            hidden_size: self.input_width,
            num_heads: self.num_heads,
        }
        .init(device);

        // Bidirectionality doubles the width at every block's output,
        // so stacked layers after the first consume 2 * hidden_size.
        let lstm1 = self.recurrent_block(self.input_width * self.num_heads, device);
        let lstm2 = self.recurrent_block(self.hidden_size * 2, device);

        SpeechClassifier {
            attention,
            lstm1,
            norm1: BatchNormConfig::new(self.hidden_size * 2).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            lstm2,
            norm2: BatchNormConfig::new(self.hidden_size * 2).init(device),
            output: LinearConfig::new(self.hidden_size * 2, 1).init(device),
        }
    }

    fn recurrent_block<B: Backend>(&self, first_input: usize, device: &B::Device) -> Vec<BiLstm<B>> {
        (0..self.num_layers)
            .map(|layer| {
                let d_input = if layer == 0 { first_input } else { self.hidden_size * 2 };
                BiLstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect()
    }

    /// True when `other` would produce parameter tensors of identical
    /// shapes. Dropout is excluded — it carries no parameters.
    pub fn same_shape(&self, other: &SpeechClassifierConfig) -> bool {
        self.input_width == other.input_width
            && self.hidden_size == other.hidden_size
            && self.num_layers == other.num_layers
            && self.num_heads == other.num_heads
    }

    /// Human-readable architecture key used in mismatch diagnostics.
    pub fn shape_key(&self) -> String {
        format!(
            "input_width={} hidden_size={} num_layers={} num_heads={}",
            self.input_width, self.hidden_size, self.num_layers, self.num_heads
        )
    }
}

#[derive(Config, Debug)]
pub struct MultiHeadAttentionConfig {
    pub hidden_size: usize,
    pub num_heads: usize,
}

impl MultiHeadAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MultiHeadAttention<B> {
        let heads = (0..self.num_heads)
            .map(|_| AttentionBlock::new(self.hidden_size, device))
            .collect();
        MultiHeadAttention { heads }
    }
}

// ─── AttentionBlock ───────────────────────────────────────────────────────────
/// Scaled dot-product self-attention over a sequence of hidden
/// vectors of width H. Output has the same shape as the input.
#[derive(Module, Debug)]
pub struct AttentionBlock<B: Backend> {
    wq: Linear<B>,
    wk: Linear<B>,
    wv: Linear<B>,
    hidden_size: usize,
}

impl<B: Backend> AttentionBlock<B> {
    pub fn new(hidden_size: usize, device: &B::Device) -> Self {
        Self {
            wq: LinearConfig::new(hidden_size, hidden_size).init(device),
            wk: LinearConfig::new(hidden_size, hidden_size).init(device),
            wv: LinearConfig::new(hidden_size, hidden_size).init(device),
            hidden_size,
        }
    }

    /// Row-wise attention distribution: softmax(Q·Kᵗ / √H).
    ///
    /// The 1/√H scaling keeps score magnitudes from saturating the
    /// softmax as H grows; burn's softmax subtracts the per-row max
    /// before exponentiating, so long sequences cannot overflow.
    pub fn attention_weights(&self, hidden: Tensor<B, 3>) -> Tensor<B, 3> {
        let query = self.wq.forward(hidden.clone());
        let key = self.wk.forward(hidden);
        let scores = query
            .matmul(key.swap_dims(1, 2))
            .div_scalar((self.hidden_size as f32).sqrt());
        activation::softmax(scores, 2)
    }

    pub fn forward(&self, hidden: Tensor<B, 3>) -> Tensor<B, 3> {
        let value = self.wv.forward(hidden.clone());
        let weights = self.attention_weights(hidden);
        weights.matmul(value)
    }
}

// ─── MultiHeadAttention ───────────────────────────────────────────────────────
/// K independent attention blocks over the same input, concatenated
/// along the feature axis: width H in, width H·K out. This widening
/// is what the first recurrent block's input size must match.
#[derive(Module, Debug)]
pub struct MultiHeadAttention<B: Backend> {
    heads: Vec<AttentionBlock<B>>,
}

impl<B: Backend> MultiHeadAttention<B> {
    pub fn forward(&self, hidden: Tensor<B, 3>) -> Tensor<B, 3> {
        let outputs: Vec<Tensor<B, 3>> = self
            .heads
            .iter()
            .map(|head| head.forward(hidden.clone()))
            .collect();
        Tensor::cat(outputs, 2)
    }
}

// ─── SpeechClassifier ─────────────────────────────────────────────────────────
/// Attention front end, two stacked bidirectional recurrent blocks
/// with per-timestep normalization and dropout between them, and a
/// single-logit projection. No activation inside — callers apply
/// sigmoid and threshold.
#[derive(Module, Debug)]
pub struct SpeechClassifier<B: Backend> {
    attention: MultiHeadAttention<B>,
    lstm1: Vec<BiLstm<B>>,
    norm1: BatchNorm<B, 1>,
    dropout: Dropout,
    lstm2: Vec<BiLstm<B>>,
    norm2: BatchNorm<B, 1>,
    output: Linear<B>,
}

impl<B: Backend> SpeechClassifier<B> {
    /// Classify a batch of bare feature vectors, each treated as a
    /// length-1 sequence. Returns one logit per example.
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch, _width] = features.dims();
        let logits = self.forward_sequence(features.unsqueeze_dim(1));
        logits.reshape([batch])
    }

    /// Full sequence path: [batch, seq, W] in, [batch, seq, 1] out.
    pub fn forward_sequence(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let mut x = self.attention.forward(input);

        for lstm in &self.lstm1 {
            let (out, _state) = lstm.forward(x, None);
            x = out;
        }
        x = self.normalize(&self.norm1, x);
        x = self.dropout.forward(x);

        for lstm in &self.lstm2 {
            let (out, _state) = lstm.forward(x, None);
            x = out;
        }
        x = self.normalize(&self.norm2, x);

        self.output.forward(x)
    }

    /// Normalization runs over the feature axis for every timestep.
    /// BatchNorm expects channels in dim 1, so swap the time and
    /// feature axes around the call.
    fn normalize(&self, norm: &BatchNorm<B, 1>, x: Tensor<B, 3>) -> Tensor<B, 3> {
        norm.forward(x.swap_dims(1, 2)).swap_dims(1, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::EvalBackend;

    type B = EvalBackend;

    fn device() -> <B as Backend>::Device {
        Default::default()
    }

    #[test]
    fn multi_head_output_width_is_h_times_k() {
        let _rng = crate::ml::test_support::rng_lock();
        let device = device();
        for k in [1usize, 2, 4] {
            let mha = MultiHeadAttentionConfig { hidden_size: 7, num_heads: k }.init::<B>(&device);
            let input = Tensor::<B, 3>::ones([2, 3, 7], &device);
            let out = mha.forward(input);
            assert_eq!(out.dims(), [2, 3, 7 * k]);
        }
    }

    #[test]
    fn attention_block_preserves_shape() {
        let _rng = crate::ml::test_support::rng_lock();
        let device = device();
        let block = AttentionBlock::<B>::new(5, &device);
        let input = Tensor::<B, 3>::ones([1, 4, 5], &device);
        assert_eq!(block.forward(input).dims(), [1, 4, 5]);
    }

    #[test]
    fn attention_weight_rows_sum_to_one() {
        let _rng = crate::ml::test_support::rng_lock();
        let device = device();
        let block = AttentionBlock::<B>::new(6, &device);
        let input = Tensor::<B, 1>::from_floats(
            (0..48).map(|i| (i as f32 * 0.37).sin()).collect::<Vec<_>>().as_slice(),
            &device,
        )
        .reshape([2, 4, 6]);

        let weights = block.attention_weights(input);
        let row_sums: Vec<f32> = weights.sum_dim(2).into_data().to_vec().unwrap();
        for sum in row_sums {
            assert!((sum - 1.0).abs() < 1e-4, "row sum {sum} != 1");
        }
    }

    #[test]
    fn classifier_emits_one_logit_per_example() {
        let _rng = crate::ml::test_support::rng_lock();
        let device = device();
        let model = SpeechClassifierConfig::new(28, 8, 2, 2, 0.0).init::<B>(&device);
        let features = Tensor::<B, 2>::ones([4, 28], &device);
        let logits = model.forward(features);
        assert_eq!(logits.dims(), [4]);
        let values: Vec<f32> = logits.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn single_vector_runs_as_length_one_sequence() {
        let _rng = crate::ml::test_support::rng_lock();
        let device = device();
        let model = SpeechClassifierConfig::new(10, 4, 1, 3, 0.0).init::<B>(&device);
        let features = Tensor::<B, 2>::ones([1, 10], &device);
        assert_eq!(model.forward(features).dims(), [1]);
    }

    #[test]
    fn shape_key_covers_all_four_hyperparameters() {
        let a = SpeechClassifierConfig::new(28, 128, 2, 8, 0.3);
        let b = SpeechClassifierConfig::new(28, 128, 2, 8, 0.5);
        let c = SpeechClassifierConfig::new(28, 64, 2, 8, 0.3);
        assert!(a.same_shape(&b)); // dropout carries no parameters
        assert!(!a.same_shape(&c));
    }
}
