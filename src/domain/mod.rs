// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or audio decoding
//   - Only plain structs, enums, and constants
//
// The feature schema lives here because it is the contract
// shared by the extractor, the vectorizer, the feature table,
// and the model input width. Every other layer refers back to
// these definitions instead of assuming an ordering.

// The acoustic feature bundle and its versioned column schema
pub mod features;

// Typed error kinds shared across layers
pub mod errors;
