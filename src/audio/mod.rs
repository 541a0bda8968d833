// ============================================================
// Layer 4 — Audio Pipeline
// ============================================================
// Everything between a .wav file on disk and a complete
// FeatureBundle. The pipeline flows in this order:
//
//   .wav file
//       │
//       ▼
//   wave       → decodes PCM, mixes down to mono
//       │
//       ▼
//   dsp        → framing, Hann window, magnitude spectra,
//                RMS / ZCR / spectral stats / MFCCs
//       │
//       ▼
//   pitch      → YIN fundamental-frequency estimate
//       │
//       ▼
//   extractor  → assembles the FeatureBundle, rejects
//                non-finite results
//
// All quantities are computed per frame and averaged over the
// full recording, so every waveform collapses to one bundle of
// fixed dimensionality regardless of its length.

/// WAV decoding and mono mixdown
pub mod wave;

/// Framing, windowing, and spectral feature computation
pub mod dsp;

/// YIN fundamental-frequency estimation
pub mod pitch;

/// Assembles one FeatureBundle per waveform file
pub mod extractor;
