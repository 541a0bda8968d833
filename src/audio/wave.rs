// ============================================================
// Layer 4 — WAV Decoding
// ============================================================
// Reads a .wav file with hound and normalizes it to mono f32
// samples in [-1, 1]. The native sample rate is kept — every
// downstream computation carries the rate alongside the samples
// instead of assuming one.

use std::path::Path;

use crate::domain::errors::ScreenError;

/// A decoded, mono waveform.
#[derive(Debug, Clone)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration_s(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode a WAV file into a mono waveform.
///
/// Integer PCM is scaled by 2^(bits-1) so 16-, 24- and 32-bit files
/// land in the same [-1, 1] range as float files. Multi-channel audio
/// is mixed down by averaging the channels per frame.
pub fn load_wav(path: &Path) -> Result<Waveform, ScreenError> {
    let display = path.display().to_string();

    let mut reader = hound::WavReader::open(path)
        .map_err(|e| ScreenError::extraction(&display, format!("cannot open WAV: {e}")))?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(ScreenError::extraction(&display, "WAV header declares zero channels"));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| ScreenError::extraction(&display, format!("corrupt float samples: {e}")))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| ScreenError::extraction(&display, format!("corrupt PCM samples: {e}")))?
        }
    };

    if interleaved.is_empty() {
        return Err(ScreenError::extraction(&display, "zero-length audio"));
    }

    // Mix down to mono: average the channels of each frame
    let samples: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(Waveform { samples, sample_rate: spec.sample_rate })
}
