//! Narration payload handling
//!
//! Speech models often return headerless 16-bit PCM
//! (`audio/L16;codec=pcm;rate=24000`). Those payloads are wrapped in a WAV
//! container so the stored `narration.wav` plays anywhere.

use shortsmith_core::{Result, ShortsError};
use std::io::Cursor;

use crate::provider::InlineData;

pub const WAV_MIME: &str = "audio/wav";
const DEFAULT_PCM_RATE: u32 = 24_000;

/// Return a WAV version of a speech payload.
///
/// WAV input is passed through and raw PCM is wrapped. Other formats are
/// rejected, since the narration is always exported as `narration.wav`.
pub fn ensure_wav(payload: &InlineData) -> Result<InlineData> {
    let mime = payload.mime_type.to_ascii_lowercase();
    if mime.starts_with("audio/wav") || mime.starts_with("audio/x-wav") {
        return Ok(payload.clone());
    }

    let bytes = payload.decode()?;
    if bytes.starts_with(b"RIFF") {
        return Ok(InlineData::from_bytes(WAV_MIME, &bytes));
    }

    if mime.contains("l16") || mime.contains("pcm") {
        let rate = pcm_rate(&mime).unwrap_or(DEFAULT_PCM_RATE);
        let wav = pcm_to_wav(&bytes, rate)?;
        return Ok(InlineData::from_bytes(WAV_MIME, &wav));
    }

    Err(ShortsError::MalformedResponse(format!(
        "Unsupported narration audio type '{}'",
        payload.mime_type
    )))
}

/// Wrap mono little-endian 16-bit PCM in a WAV container
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ShortsError::Generation(format!("Failed to start WAV: {}", e)))?;
        for frame in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([frame[0], frame[1]]))
                .map_err(|e| ShortsError::Generation(format!("Failed to write WAV: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| ShortsError::Generation(format!("Failed to finish WAV: {}", e)))?;
    }
    Ok(cursor.into_inner())
}

/// Duration of a WAV payload in seconds, if it parses
pub fn wav_duration_secs(wav: &[u8]) -> Option<f64> {
    let reader = hound::WavReader::new(Cursor::new(wav)).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f64 / spec.sample_rate as f64)
}

fn pcm_rate(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}
