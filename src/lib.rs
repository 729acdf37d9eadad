//! `clarify` — a small, focused speech-enhancement demo pipeline.
//!
//! This crate provides:
//! - Clean reference acquisition (file decoding with a deterministic synthetic fallback)
//! - Calibrated additive-noise injection
//! - STFT magnitude spectrograms
//! - A pluggable enhancement backend with a deterministic fallback blend
//! - Energy-threshold voice activity detection
//! - Playback-ready WAV payload encoding
//!
//! The library is designed to sit behind an interactive dashboard, with an emphasis on
//! graceful degradation and minimal surprises: sample loading and enhancement never fail
//! the user-visible pipeline, and the one boundary the UI depends on
//! ([`pipeline::PipelineOutput`]) stays stable if the UI is reimplemented independently.

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;

// Core processing stages.
pub mod enhance;
pub mod noise;
pub mod sample;
pub mod spectrogram;
pub mod vad;

// Audio I/O: container decoding and playback payload encoding.
pub mod decoder;
pub mod wav;

// Crate-wide error type.
pub mod error;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineOutput};
