//! Energy-threshold voice activity detection.
//!
//! Frames of 25 ms hop by 10 ms over the signal; each frame's energy is compared against
//! the 30th percentile of all frame energies from the same call. The threshold adapts to
//! the clip's overall level rather than using a fixed constant.

use serde::Serialize;

/// Analysis frame length in seconds.
const FRAME_SECS: f32 = 0.025;

/// Hop between frame starts in seconds.
const HOP_SECS: f32 = 0.010;

/// Percentile of the energy sequence used as the activity threshold.
const THRESHOLD_PERCENTILE: f32 = 30.0;

/// A per-frame binary voice-activity trace.
///
/// `times` and `activity` are parallel sequences with one entry per analysis frame, evenly
/// spaced over the full signal duration. Activity is 1.0 for frames whose energy strictly
/// exceeds the adaptive threshold, 0.0 otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct VadTrace {
    /// Frame times in seconds, evenly spaced over `[0, duration]` inclusive.
    pub times: Vec<f32>,

    /// Per-frame activity, 1.0 or 0.0.
    pub activity: Vec<f32>,
}

impl VadTrace {
    /// Number of analysis frames in the trace.
    pub fn len(&self) -> usize {
        self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    /// Iterate the trace as `(time, activity)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.times.iter().copied().zip(self.activity.iter().copied())
    }
}

/// Derive a voice-activity trace from short-time energy.
///
/// A signal not longer than one frame yields zero frames: the empty trace is a defined
/// result, not an error.
pub fn detect_activity(signal: &[f32], sample_rate: u32) -> VadTrace {
    let frame_len = (FRAME_SECS * sample_rate as f32) as usize;
    let hop_len = (HOP_SECS * sample_rate as f32) as usize;

    if frame_len == 0 || hop_len == 0 || signal.len() <= frame_len {
        return VadTrace {
            times: Vec::new(),
            activity: Vec::new(),
        };
    }

    let num_frames = (signal.len() - frame_len) / hop_len;
    if num_frames == 0 {
        return VadTrace {
            times: Vec::new(),
            activity: Vec::new(),
        };
    }

    let energies: Vec<f32> = (0..num_frames)
        .map(|frame| {
            let start = frame * hop_len;
            signal[start..start + frame_len]
                .iter()
                .map(|s| s * s)
                .sum()
        })
        .collect();

    let threshold = percentile(&energies, THRESHOLD_PERCENTILE);

    // Strictly greater-than: an all-silence clip (threshold 0) stays fully inactive.
    let activity = energies
        .iter()
        .map(|&energy| if energy > threshold { 1.0 } else { 0.0 })
        .collect();

    let duration = signal.len() as f32 / sample_rate as f32;
    let times = (0..num_frames)
        .map(|frame| {
            if num_frames == 1 {
                0.0
            } else {
                duration * frame as f32 / (num_frames - 1) as f32
            }
        })
        .collect();

    VadTrace { times, activity }
}

/// Linear-interpolation percentile over an unsorted sequence.
///
/// `pct` is in [0, 100]. The caller guarantees `values` is non-empty.
fn percentile(values: &[f32], pct: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let rank = pct / 100.0 * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        return sorted[lower];
    }

    let weight = rank - lower as f32;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_linearly() {
        let values: Vec<f32> = (0..=10).map(|v| v as f32).collect();
        assert_eq!(percentile(&values, 0.0), 0.0);
        assert_eq!(percentile(&values, 30.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 10.0);

        let values = vec![1.0, 2.0];
        assert!((percentile(&values, 30.0) - 1.3).abs() < 1e-6);
    }

    #[test]
    fn frame_count_for_three_seconds_at_16k() {
        let trace = detect_activity(&vec![0.0; 48_000], 16_000);
        // frame = 400 samples, hop = 160: (48000 - 400) / 160 frames.
        assert_eq!(trace.len(), 297);
        assert_eq!(trace.times.len(), trace.activity.len());
    }

    #[test]
    fn all_silence_is_fully_inactive() {
        let trace = detect_activity(&vec![0.0; 48_000], 16_000);
        assert!(trace.activity.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn constant_signal_is_fully_inactive() {
        // Every frame has identical energy, so no energy strictly exceeds the threshold.
        let trace = detect_activity(&vec![0.5; 16_000], 16_000);
        assert!(!trace.is_empty());
        assert!(trace.activity.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn loud_burst_is_detected() {
        let sample_rate = 16_000;
        let mut signal = vec![0.0f32; 48_000];
        for (i, sample) in signal[16_000..32_000].iter_mut().enumerate() {
            *sample = (std::f32::consts::TAU * 440.0 * i as f32 / sample_rate as f32).sin();
        }

        let trace = detect_activity(&signal, sample_rate);

        let active: Vec<(f32, f32)> = trace.pairs().filter(|&(_, a)| a == 1.0).collect();
        assert!(!active.is_empty());
        // Active frames sit inside the burst's second of audio.
        for (time, _) in active {
            assert!(time > 0.9 && time < 2.1);
        }

        // The leading silence stays inactive.
        assert_eq!(trace.activity[0], 0.0);
    }

    #[test]
    fn short_signal_yields_empty_trace() {
        let trace = detect_activity(&vec![0.5; 100], 16_000);
        assert!(trace.is_empty());
        assert!(trace.times.is_empty());
    }

    #[test]
    fn times_span_signal_duration() {
        let trace = detect_activity(&vec![0.0; 48_000], 16_000);
        assert_eq!(trace.times[0], 0.0);
        assert!((trace.times[trace.len() - 1] - 3.0).abs() < 1e-6);
    }
}
