// ============================================================
// Layer 4 — Fundamental Frequency (YIN)
// ============================================================
// Per-frame YIN estimate restricted to a 50–500 Hz search band,
// averaged over all frames.
//
// YIN in three steps per frame (de Cheveigné & Kawahara 2002):
//   1. difference function d(τ) over half the frame
//   2. cumulative-mean-normalized difference d'(τ), which
//      removes the bias toward τ = 0
//   3. pick the first τ where d'(τ) drops below the absolute
//      threshold (falling to the local minimum), or the global
//      minimum if no dip crosses the threshold
// A parabolic fit around the chosen lag refines it to
// sub-sample precision before converting to Hz.

use crate::audio::dsp::for_each_frame;

/// Lower edge of the pitch search band, in Hz
pub const PITCH_FMIN: f32 = 50.0;

/// Upper edge of the pitch search band, in Hz
pub const PITCH_FMAX: f32 = 500.0;

/// Absolute threshold on the normalized difference function
const YIN_THRESHOLD: f32 = 0.1;

/// Frame-averaged fundamental frequency of `samples`, clamped to
/// the search band. Returns 0.0 only for empty input.
pub fn mean_f0(samples: &[f32], sample_rate: u32) -> f32 {
    let mut sum = 0.0f32;
    let mut frames = 0usize;
    for_each_frame(samples, |frame| {
        sum += yin_frame(frame, sample_rate);
        frames += 1;
    });
    if frames == 0 { 0.0 } else { sum / frames as f32 }
}

fn yin_frame(frame: &[f32], sample_rate: u32) -> f32 {
    let sr = sample_rate as f32;
    let half = frame.len() / 2;
    let tau_min = ((sr / PITCH_FMAX).floor() as usize).max(1);
    let tau_max = ((sr / PITCH_FMIN).ceil() as usize).min(half.saturating_sub(1));
    if tau_max <= tau_min {
        return PITCH_FMIN;
    }

    // Step 1: difference function
    let mut diff = vec![0.0f32; tau_max + 1];
    for tau in 1..=tau_max {
        let mut acc = 0.0f32;
        for j in 0..half {
            let d = frame[j] - frame[j + tau];
            acc += d * d;
        }
        diff[tau] = acc;
    }

    // Step 2: cumulative-mean normalization
    let mut cmndf = vec![1.0f32; tau_max + 1];
    let mut running = 0.0f32;
    for tau in 1..=tau_max {
        running += diff[tau];
        cmndf[tau] = if running > 0.0 {
            diff[tau] * tau as f32 / running
        } else {
            1.0
        };
    }

    // Step 3: absolute threshold with fallback to the global minimum
    let mut tau_est = None;
    let mut tau = tau_min;
    while tau <= tau_max {
        if cmndf[tau] < YIN_THRESHOLD {
            // Descend to the bottom of this dip
            while tau + 1 <= tau_max && cmndf[tau + 1] < cmndf[tau] {
                tau += 1;
            }
            tau_est = Some(tau);
            break;
        }
        tau += 1;
    }
    let tau_est = tau_est.unwrap_or_else(|| {
        (tau_min..=tau_max)
            .min_by(|&a, &b| cmndf[a].total_cmp(&cmndf[b]))
            .unwrap_or(tau_min)
    });

    let refined = parabolic_refine(&cmndf, tau_est, tau_min, tau_max);
    (sr / refined).clamp(PITCH_FMIN, PITCH_FMAX)
}

/// Fit a parabola through the chosen lag and its neighbours and
/// return the interpolated minimum position.
fn parabolic_refine(cmndf: &[f32], tau: usize, tau_min: usize, tau_max: usize) -> f32 {
    if tau <= tau_min || tau >= tau_max {
        return tau as f32;
    }
    let (a, b, c) = (cmndf[tau - 1], cmndf[tau], cmndf[tau + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() < f32::EPSILON {
        return tau as f32;
    }
    let shift = 0.5 * (a - c) / denom;
    tau as f32 + shift.clamp(-1.0, 1.0)
}
