// ============================================================
// Layer 3 — Error Kinds
// ============================================================
// Four failure categories with different propagation policies:
//
//   ExtractionFailure      — recoverable in batch mode (log and skip
//                            the file), fatal in single-file inference
//   SchemaMismatch         — always fatal: the extractor and the model
//                            disagree about the feature contract
//   NonFiniteLoss          — always fatal: continuing would corrupt
//                            every subsequent gradient step
//   ParameterShapeMismatch — fatal at snapshot load time
//
// The application layer propagates these through anyhow, so tests
// and callers can still downcast to the concrete kind.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    /// The waveform could not be read, was empty, or produced a
    /// non-finite feature value.
    #[error("feature extraction failed for '{path}': {reason}")]
    ExtractionFailure { path: String, reason: String },

    /// The feature set no longer matches the model's input contract.
    /// Carries enough context to diagnose without re-running.
    #[error("feature schema mismatch: {detail}")]
    SchemaMismatch { detail: String },

    /// Training produced a NaN or infinite loss.
    #[error("non-finite loss at epoch {epoch}, batch {batch}")]
    NonFiniteLoss { epoch: usize, batch: usize },

    /// A parameter snapshot was loaded against incompatible
    /// architecture hyperparameters.
    #[error("parameter snapshot mismatch: {0}")]
    ParameterShapeMismatch(String),
}

impl ScreenError {
    pub fn extraction(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExtractionFailure { path: path.into(), reason: reason.into() }
    }

    pub fn schema(detail: impl Into<String>) -> Self {
        Self::SchemaMismatch { detail: detail.into() }
    }
}
