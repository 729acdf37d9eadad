//! Short-time Fourier magnitude spectrograms for the dashboard heatmaps.
//!
//! Half-overlap Hann-windowed STFT, window 1024 / hop 512. Frames are centered on
//! `k * hop` by zero-extending half a window on each side, and the tail is padded so the
//! final frame still sees a full window. Spectra are scaled by the window sum so bin
//! magnitudes read as amplitudes.

use std::f32::consts::TAU;

use realfft::RealFftPlanner;
use serde::Serialize;

/// STFT analysis window length in samples.
pub const WINDOW_LEN: usize = 1024;

/// Hop between adjacent frames (half-overlap).
pub const HOP_LEN: usize = WINDOW_LEN / 2;

/// Floor added to magnitudes before the dB conversion so all-zero bins stay finite.
const MAGNITUDE_EPSILON: f32 = 1e-10;

/// A time-frequency magnitude map in decibels.
///
/// `magnitude_db` holds one row per frequency bin and one column per frame:
/// `magnitude_db[bin][frame]`.
///
/// Invariants: `freqs.len() == magnitude_db.len()`, and every row has `times.len()`
/// entries.
///
/// The full bin set is always returned. The dashboard historically renders only the lowest
/// quarter of the bins; that truncation is a visualization concern and is left to the
/// caller.
#[derive(Debug, Clone, Serialize)]
pub struct Spectrogram {
    /// Frequency-axis coordinates in Hz, one per bin (`WINDOW_LEN / 2 + 1` entries).
    pub freqs: Vec<f32>,

    /// Time-axis coordinates in seconds, one per frame.
    pub times: Vec<f32>,

    /// Magnitude in dB, indexed `[bin][frame]`.
    pub magnitude_db: Vec<Vec<f32>>,
}

/// Compute the magnitude spectrogram of `signal`.
///
/// `magnitude_db = 20 * log10(|X| + 1e-10)`; the epsilon guarantees finite output even for
/// an all-zero input.
pub fn spectrogram(signal: &[f32], sample_rate: u32) -> Spectrogram {
    let num_bins = WINDOW_LEN / 2 + 1;
    let num_frames = signal.len().div_ceil(HOP_LEN) + 1;

    let window = hann_window(WINDOW_LEN);
    let window_sum: f32 = window.iter().sum();

    // Half a window of zeros in front centers frame k on sample k * hop; the tail padding
    // gives the last frame a full window.
    let mut extended = vec![0.0f32; WINDOW_LEN / 2];
    extended.extend_from_slice(signal);
    extended.resize((num_frames - 1) * HOP_LEN + WINDOW_LEN, 0.0);

    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(WINDOW_LEN);
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let mut magnitude_db = vec![Vec::with_capacity(num_frames); num_bins];

    for frame in 0..num_frames {
        let start = frame * HOP_LEN;
        for (slot, (sample, w)) in input
            .iter_mut()
            .zip(extended[start..start + WINDOW_LEN].iter().zip(&window))
        {
            *slot = sample * w;
        }

        fft.process(&mut input, &mut spectrum).expect("FFT failed");

        for (bin, value) in spectrum.iter().enumerate() {
            let magnitude = value.norm() / window_sum;
            magnitude_db[bin].push(20.0 * (magnitude + MAGNITUDE_EPSILON).log10());
        }
    }

    let freqs = (0..num_bins)
        .map(|bin| bin as f32 * sample_rate as f32 / WINDOW_LEN as f32)
        .collect();
    let times = (0..num_frames)
        .map(|frame| (frame * HOP_LEN) as f32 / sample_rate as f32)
        .collect();

    Spectrogram {
        freqs,
        times,
        magnitude_db,
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (TAU * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_window_shape() {
        let window = hann_window(WINDOW_LEN);
        assert!(window[0].abs() < 0.01);
        assert!((window[WINDOW_LEN / 2] - 1.0).abs() < 0.01);
        assert!(window[WINDOW_LEN - 1].abs() < 0.01);
    }

    #[test]
    fn shapes_are_consistent() {
        let signal = vec![0.5; 16_000];
        let spec = spectrogram(&signal, 16_000);

        assert_eq!(spec.freqs.len(), 513);
        assert_eq!(spec.magnitude_db.len(), spec.freqs.len());
        for row in &spec.magnitude_db {
            assert_eq!(row.len(), spec.times.len());
        }
    }

    #[test]
    fn frequency_axis_spans_nyquist() {
        let spec = spectrogram(&vec![0.0; 4096], 16_000);
        assert_eq!(spec.freqs[0], 0.0);
        assert!((spec.freqs[512] - 8_000.0).abs() < 1e-3);
    }

    #[test]
    fn all_zero_input_stays_finite() {
        let spec = spectrogram(&vec![0.0; 8192], 16_000);

        let floor_db = 20.0 * MAGNITUDE_EPSILON.log10();
        for row in &spec.magnitude_db {
            for &value in row {
                assert!(value.is_finite());
                assert!((value - floor_db).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn pure_tone_peaks_at_its_bin() {
        let sample_rate = 16_000u32;
        // 1 kHz lands exactly on bin 64 (1000 / (16000 / 1024)).
        let signal: Vec<f32> = (0..16_000)
            .map(|i| (TAU * 1_000.0 * i as f32 / sample_rate as f32).sin())
            .collect();

        let spec = spectrogram(&signal, sample_rate);

        let mid = spec.times.len() / 2;
        let peak_bin = (0..spec.freqs.len())
            .max_by(|&a, &b| {
                spec.magnitude_db[a][mid]
                    .partial_cmp(&spec.magnitude_db[b][mid])
                    .unwrap()
            })
            .unwrap();

        assert_eq!(peak_bin, 64);
    }

    #[test]
    fn frame_count_covers_signal() {
        let spec = spectrogram(&vec![0.0; 48_000], 16_000);
        // ceil(48000 / 512) + 1 frames, spaced hop/sr apart starting at zero.
        assert_eq!(spec.times.len(), 95);
        assert_eq!(spec.times[0], 0.0);
        assert!((spec.times[94] - 94.0 * 512.0 / 16_000.0).abs() < 1e-6);
    }
}
