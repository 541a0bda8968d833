// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a FeatureBundle and a tensor batch:
//
//   FeatureBundle
//       │
//       ▼
//   FeatureVectorizer → fixed-width numeric vector
//       │                (schema order, zero pad, reject overlong)
//       ▼
//   FeatureTable      → CSV rows, one per waveform; validated
//       │                against the schema on read-back
//       ▼
//   SpeechDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   SpeechBatcher     → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.

/// Flattens bundles into fixed-width vectors
pub mod vectorizer;

/// Feature table CSV writing and validated read-back
pub mod table;

/// Implements Burn's Dataset trait for labeled feature vectors
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle and train/validation split
pub mod splitter;
