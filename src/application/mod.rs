// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// batch feature extraction, model training, or classifying a
// single recording.
//
// Rules for this layer:
//   - No DSP or model math here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

// Batch extraction: directory of .wav files → feature table
pub mod extract_use_case;

// The training workflow
pub mod train_use_case;

// Single-recording classification workflow
pub mod classify_use_case;
