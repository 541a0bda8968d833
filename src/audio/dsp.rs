// ============================================================
// Layer 4 — Spectral Feature Computation
// ============================================================
// Frame-based DSP for the acoustic features: RMS energy, zero
// crossing rate, spectral centroid / bandwidth / rolloff, and
// mel-frequency cepstral coefficients.
//
// Framing convention: 2048-sample frames, 512-sample hop, Hann
// window before each FFT. A signal shorter than one frame is
// zero-padded into a single frame so short recordings still
// produce a complete feature set.
//
// Each quantity is computed per frame and then averaged over
// all frames, collapsing a recording of any length into one
// scalar per feature (one scalar per coefficient for MFCCs).

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::domain::features::MFCC_COUNT;

/// FFT window size in samples
pub const FRAME_LEN: usize = 2048;

/// Advance between consecutive frames
pub const HOP_LEN: usize = 512;

/// Mel filterbank resolution feeding the cepstral transform
const N_MELS: usize = 40;

/// Floor applied to mel energies before the log, to keep silent
/// frames from producing -inf coefficients
const LOG_FLOOR: f32 = 1e-10;

/// Visit every analysis frame of `samples`, zero-padding the tail
/// (and a too-short signal) to FRAME_LEN.
pub fn for_each_frame(samples: &[f32], mut visit: impl FnMut(&[f32])) {
    if samples.is_empty() {
        return;
    }
    if samples.len() < FRAME_LEN {
        let mut padded = vec![0.0f32; FRAME_LEN];
        padded[..samples.len()].copy_from_slice(samples);
        visit(&padded);
        return;
    }
    let mut start = 0;
    while start + FRAME_LEN <= samples.len() {
        visit(&samples[start..start + FRAME_LEN]);
        start += HOP_LEN;
    }
}

/// Root-mean-square energy per frame, averaged over frames.
pub fn mean_rms(samples: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    let mut frames = 0usize;
    for_each_frame(samples, |frame| {
        let energy: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
        sum += energy.sqrt();
        frames += 1;
    });
    if frames == 0 { 0.0 } else { sum / frames as f32 }
}

/// Zero-crossing rate per frame, averaged over frames.
/// Higher values indicate noisy or unvoiced content.
pub fn mean_zcr(samples: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    let mut frames = 0usize;
    for_each_frame(samples, |frame| {
        sum += frame_zcr(frame);
        frames += 1;
    });
    if frames == 0 { 0.0 } else { sum / frames as f32 }
}

fn frame_zcr(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let mut crossings = 0usize;
    for i in 1..frame.len() {
        if (frame[i] >= 0.0) != (frame[i - 1] >= 0.0) {
            crossings += 1;
        }
    }
    crossings as f32 / (frame.len() - 1) as f32
}

/// Frame-averaged spectral shape statistics.
#[derive(Debug, Clone, Copy)]
pub struct SpectralStats {
    /// Center of mass of the magnitude spectrum, in Hz
    pub centroid: f32,
    /// Magnitude-weighted spread around the centroid, in Hz
    pub bandwidth: f32,
    /// Frequency below which 85% of spectral magnitude lies, in Hz
    pub rolloff: f32,
}

const ROLLOFF_FRACTION: f32 = 0.85;

/// Windowed-FFT front end shared by the spectral features and MFCCs.
/// Holds the FFT plan and the Hann window so per-frame work is
/// just multiply + transform.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FRAME_LEN);
        let window: Vec<f32> = (0..FRAME_LEN)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FRAME_LEN as f32).cos())
            })
            .collect();
        Self { fft, window }
    }

    /// Hann-windowed magnitude spectrum of one frame
    /// (FRAME_LEN/2 + 1 bins).
    pub fn magnitudes(&self, frame: &[f32]) -> Vec<f32> {
        let mut input: Vec<f32> = frame
            .iter()
            .zip(&self.window)
            .map(|(s, w)| s * w)
            .collect();
        input.resize(FRAME_LEN, 0.0);
        let mut spectrum = self.fft.make_output_vec();
        // Buffer sizes are fixed by the plan above, so process cannot fail
        self.fft
            .process(&mut input, &mut spectrum)
            .expect("FFT buffers sized by the planner");
        spectrum.iter().map(|c| c.norm()).collect()
    }

    /// Centroid, bandwidth, and rolloff, each averaged over frames.
    pub fn spectral_stats(&self, samples: &[f32], sample_rate: u32) -> SpectralStats {
        let bin_width = sample_rate as f32 / FRAME_LEN as f32;
        let mut centroid_sum = 0.0f32;
        let mut bandwidth_sum = 0.0f32;
        let mut rolloff_sum = 0.0f32;
        let mut frames = 0usize;

        for_each_frame(samples, |frame| {
            let mags = self.magnitudes(frame);
            let total: f32 = mags.iter().sum();

            let centroid = if total > 0.0 {
                mags.iter()
                    .enumerate()
                    .map(|(i, &m)| i as f32 * bin_width * m)
                    .sum::<f32>()
                    / total
            } else {
                0.0
            };

            let bandwidth = if total > 0.0 {
                let var = mags
                    .iter()
                    .enumerate()
                    .map(|(i, &m)| {
                        let d = i as f32 * bin_width - centroid;
                        m * d * d
                    })
                    .sum::<f32>()
                    / total;
                var.sqrt()
            } else {
                0.0
            };

            let rolloff = {
                let target = total * ROLLOFF_FRACTION;
                let mut acc = 0.0f32;
                let mut bin = 0usize;
                for (i, &m) in mags.iter().enumerate() {
                    acc += m;
                    bin = i;
                    if acc >= target {
                        break;
                    }
                }
                bin as f32 * bin_width
            };

            centroid_sum += centroid;
            bandwidth_sum += bandwidth;
            rolloff_sum += rolloff;
            frames += 1;
        });

        if frames == 0 {
            return SpectralStats { centroid: 0.0, bandwidth: 0.0, rolloff: 0.0 };
        }
        let n = frames as f32;
        SpectralStats {
            centroid: centroid_sum / n,
            bandwidth: bandwidth_sum / n,
            rolloff: rolloff_sum / n,
        }
    }

    /// First MFCC_COUNT mel-frequency cepstral coefficients, each
    /// averaged over frames: power spectrum → triangular mel
    /// filterbank → log energies → orthonormal DCT-II.
    pub fn mfcc_means(&self, samples: &[f32], sample_rate: u32) -> [f32; MFCC_COUNT] {
        let bank = MelFilterBank::new(sample_rate);
        let mut sums = [0.0f32; MFCC_COUNT];
        let mut frames = 0usize;

        for_each_frame(samples, |frame| {
            let mags = self.magnitudes(frame);
            let power: Vec<f32> = mags.iter().map(|m| m * m).collect();
            let log_mel: Vec<f32> = bank
                .filters
                .iter()
                .map(|filt| {
                    let e: f32 = filt.iter().zip(&power).map(|(w, p)| w * p).sum();
                    e.max(LOG_FLOOR).ln()
                })
                .collect();

            for (k, sum) in sums.iter_mut().enumerate() {
                *sum += dct2_ortho(&log_mel, k);
            }
            frames += 1;
        });

        if frames > 0 {
            for sum in sums.iter_mut() {
                *sum /= frames as f32;
            }
        }
        sums
    }
}

/// Orthonormal DCT-II coefficient k of `input`.
fn dct2_ortho(input: &[f32], k: usize) -> f32 {
    let n = input.len() as f32;
    let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
    let acc: f32 = input
        .iter()
        .enumerate()
        .map(|(m, &x)| x * (std::f32::consts::PI * k as f32 * (m as f32 + 0.5) / n).cos())
        .sum();
    scale * acc
}

/// Triangular mel filterbank over the FRAME_LEN/2 + 1 FFT bins.
struct MelFilterBank {
    filters: Vec<Vec<f32>>,
}

impl MelFilterBank {
    fn new(sample_rate: u32) -> Self {
        let n_bins = FRAME_LEN / 2 + 1;
        let f_max = sample_rate as f32 / 2.0;
        let mel_max = hz_to_mel(f_max);

        // N_MELS + 2 equally spaced mel points → N_MELS triangles
        let points: Vec<f32> = (0..N_MELS + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (N_MELS + 1) as f32))
            .collect();
        let bin_width = sample_rate as f32 / FRAME_LEN as f32;

        let filters = (0..N_MELS)
            .map(|m| {
                let (lo, mid, hi) = (points[m], points[m + 1], points[m + 2]);
                (0..n_bins)
                    .map(|b| {
                        let f = b as f32 * bin_width;
                        if f <= lo || f >= hi {
                            0.0
                        } else if f <= mid {
                            (f - lo) / (mid - lo).max(f32::EPSILON)
                        } else {
                            (hi - f) / (hi - mid).max(f32::EPSILON)
                        }
                    })
                    .collect()
            })
            .collect();

        Self { filters }
    }
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}
