//! High-level API for running full enhancement passes.
//!
//! We expose a single, ergonomic entry point (`Pipeline`) that wires together the
//! lower-level sample, noise, enhancement, spectrogram, VAD, and encoding logic.
//!
//! The intent is:
//! - We acquire the clean reference once (file decode or synthesis).
//! - We reuse it, read-only, across every parameter change.
//! - Callers configure backend behavior via `Opts` at construction time.
//!
//! This module is deliberately "high level": it wires up
//! noise → enhance → spectrogram ×3 → VAD → encode ×3, while keeping the lower-level
//! pieces testable in their own modules.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::enhance::{EnhanceBackend, Enhancer};
use crate::error::{Error, Result};
use crate::noise::add_noise;
use crate::opts::Opts;
use crate::sample::load_sample;
use crate::spectrogram::{Spectrogram, spectrogram};
use crate::vad::{VadTrace, detect_activity};
use crate::wav::{EncodedAudio, encode};

/// Result of one full pipeline pass.
///
/// This is the boundary contract the dashboard layer consumes: three spectrograms, three
/// playback payloads, and one voice-activity trace, all derived from signals sharing the
/// same length and sample rate.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Monotonically increasing pass number. Frontends racing multiple passes keep the
    /// highest revision they have seen and discard the rest (last-write-wins).
    pub revision: u64,

    pub sample_rate: u32,

    pub clean_spectrogram: Spectrogram,
    pub noisy_spectrogram: Spectrogram,
    pub enhanced_spectrogram: Spectrogram,

    pub clean_audio: EncodedAudio,
    pub noisy_audio: EncodedAudio,
    pub enhanced_audio: EncodedAudio,

    /// Voice activity derived from the enhanced signal.
    pub vad: VadTrace,
}

/// The main high-level entry point.
///
/// `Pipeline` owns the long-lived state of the demo:
/// - the immutable clean reference signal and its sample rate
/// - the enhancer configuration (credential, optional backend, timeout)
///
/// Typical usage:
/// - Construct once (reference acquisition happens here).
/// - Call `render` on every parameter change.
///
/// Rendering takes `&self`: the reference is read-only, so any number of concurrent passes
/// may share one `Pipeline`. Each pass recomputes everything fresh; nothing derived is
/// cached or persisted.
pub struct Pipeline {
    clean: Vec<f32>,
    sample_rate: u32,
    enhancer: Enhancer,
    revision: AtomicU64,
}

impl Pipeline {
    /// Create a pipeline, acquiring the clean reference per the sample-provider contract:
    /// decode `path` when given, fall back to the synthetic reference on absence or any
    /// decode failure.
    pub fn new(path: Option<&Path>, opts: &Opts) -> Self {
        let (clean, sample_rate) = load_sample(path);
        Self::from_reference(clean, sample_rate, opts)
    }

    /// Create a pipeline around an explicit clean reference.
    ///
    /// This is the dependency-injection seam: tests and embedders can supply their own
    /// reference signal instead of going through the sample provider.
    pub fn from_reference(clean: Vec<f32>, sample_rate: u32, opts: &Opts) -> Self {
        Self {
            clean,
            sample_rate,
            enhancer: Enhancer::new(opts),
            revision: AtomicU64::new(0),
        }
    }

    /// Install an external enhancement backend.
    pub fn with_backend(mut self, backend: Arc<dyn EnhanceBackend>) -> Self {
        self.enhancer = self.enhancer.with_backend(backend);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The immutable clean reference signal.
    pub fn clean_reference(&self) -> &[f32] {
        &self.clean
    }

    /// Run one full pass: noise → enhance → spectrogram ×3 → VAD → encode ×3.
    ///
    /// Parameters outside their documented domains are rejected with
    /// [`Error::InvalidParameter`] before any processing happens. Noise draws fresh
    /// randomness on every call; everything else is deterministic given the inputs.
    pub fn render(&self, noise_level_db: f32, enhancement_level: f32) -> Result<PipelineOutput> {
        self.validate(noise_level_db, enhancement_level)?;

        let noisy = add_noise(&self.clean, noise_level_db);
        let enhanced = self
            .enhancer
            .enhance(&noisy, enhancement_level, &self.clean);

        let output = PipelineOutput {
            revision: self.revision.fetch_add(1, Ordering::Relaxed) + 1,
            sample_rate: self.sample_rate,
            clean_spectrogram: spectrogram(&self.clean, self.sample_rate),
            noisy_spectrogram: spectrogram(&noisy, self.sample_rate),
            enhanced_spectrogram: spectrogram(&enhanced, self.sample_rate),
            clean_audio: encode(&self.clean, self.sample_rate)?,
            noisy_audio: encode(&noisy, self.sample_rate)?,
            enhanced_audio: encode(&enhanced, self.sample_rate)?,
            vad: detect_activity(&enhanced, self.sample_rate),
        };

        debug!(
            revision = output.revision,
            noise_level_db, enhancement_level, "pipeline pass complete"
        );

        Ok(output)
    }

    fn validate(&self, noise_level_db: f32, enhancement_level: f32) -> Result<()> {
        if !noise_level_db.is_finite() || !(-80.0..=0.0).contains(&noise_level_db) {
            return Err(Error::invalid_parameter(format!(
                "noise level must be within [-80, 0] dBFS, got {noise_level_db}"
            )));
        }

        if !enhancement_level.is_finite() || !(0.0..=1.0).contains(&enhancement_level) {
            return Err(Error::invalid_parameter(format!(
                "enhancement level must be within [0, 1], got {enhancement_level}"
            )));
        }

        if self.clean.is_empty() {
            return Err(Error::invalid_parameter("clean reference signal is empty"));
        }

        if self.sample_rate == 0 {
            return Err(Error::invalid_parameter("sample rate must be positive"));
        }

        Ok(())
    }
}
