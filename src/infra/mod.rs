// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — Full-precision parameter snapshots,
//                   keyed by the architecture hyperparameters saved
//                   alongside them. Loading against mismatched
//                   hyperparameters is an error, never a reshape.
//
//   metrics.rs    — Per-epoch training metrics appended to a CSV
//                   file for later analysis.

/// Model snapshot saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
