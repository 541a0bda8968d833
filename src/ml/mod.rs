// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly, except the thin
// Dataset/Batcher impls in the data layer.
//
// What's in this layer:
//
//   model.rs      — AttentionBlock, MultiHeadAttention, and the
//                   bidirectional recurrent classifier
//   trainer.rs    — training loop: BCE-with-logits loss, Adam
//                   steps, running accuracy, validation pass,
//                   non-finite-loss halt, per-epoch checkpoints
//   inferencer.rs — loads a snapshot, reconciles a feature
//                   vector to the trained input width, and
//                   produces a sigmoid probability
//
// Training runs on the autodiff backend; validation and
// inference run on the inner backend via model.valid(), where
// dropout is inert and batch normalization uses its running
// statistics. Forgetting to switch modes is therefore a type
// error, not a silent nondeterminism bug.
//
// The CPU ndarray backend keeps seeded runs reproducible and
// snapshot round trips bit-identical.

/// Attention front end and recurrent classifier architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference adapter — loads a snapshot and classifies recordings
pub mod inferencer;

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
pub type EvalBackend = burn::backend::NdArray;
pub type Device = burn::backend::ndarray::NdArrayDevice;
