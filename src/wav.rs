//! WAV encoding for playback payloads.
//!
//! What we produce:
//! - A peak-normalized, 16-bit signed PCM, mono WAV rendered into an in-memory buffer
//! - Tagged with its container format, and convertible to a `data:` URI for direct
//!   embedding in an audio player
//!
//! Why we normalize here:
//! - upstream stages deliberately leave signals unclipped, so the encoder is the one place
//!   amplitude is brought into playback range

use std::io::{Cursor, Read};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::error::Result;

/// Container formats produced by [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
}

impl AudioFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// A self-contained, playback-ready audio payload.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub format: AudioFormat,
    pub bytes: Vec<u8>,
}

impl EncodedAudio {
    /// Render the payload as an embeddable `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// The UI consumes audio as an embeddable data URI, so that is the wire form.
impl Serialize for EncodedAudio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EncodedAudio", 2)?;
        state.serialize_field("format", &self.format)?;
        state.serialize_field("data_uri", &self.to_data_uri())?;
        state.end()
    }
}

/// Peak-normalize `signal` and encode it as 16-bit PCM mono WAV.
///
/// The peak absolute sample maps to `i16::MAX` (32767). An all-zero signal encodes as
/// silence under the same scaling; the degenerate case is defined, not an error.
pub fn encode(signal: &[f32], sample_rate: u32) -> Result<EncodedAudio> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let peak = signal.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    let gain = if peak > 0.0 {
        i16::MAX as f32 / peak
    } else {
        i16::MAX as f32
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in signal {
            let quantized = (sample * gain)
                .round()
                .clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            writer.write_sample(quantized)?;
        }
        writer.finalize()?;
    }

    Ok(EncodedAudio {
        format: AudioFormat::Wav,
        bytes: cursor.into_inner(),
    })
}

/// Read back a 16-bit WAV payload (the format [`encode`] produces).
///
/// Returns the raw PCM samples and the parsed spec, for round-trip verification.
pub fn samples_from_wav_reader<R: Read>(reader: R) -> Result<(Vec<i16>, WavSpec)> {
    let mut reader = WavReader::new(reader)?;
    let spec = reader.spec();

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((samples, spec))
}
