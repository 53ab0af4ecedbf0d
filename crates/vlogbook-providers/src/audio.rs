//! PCM decoding and WAV encoding for synthesized speech.
//!
//! The speech API returns raw 16-bit little-endian PCM with the sample rate
//! carried in the MIME type (`audio/L16;codec=pcm;rate=24000`).

use std::path::Path;

use anyhow::{Context, Result};

use vlogbook_core::traits::SpeechAudio;

/// Sample rate assumed when the MIME type does not carry one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Extract the `rate=` parameter from an audio MIME type.
pub fn sample_rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Decode little-endian 16-bit samples. A trailing odd byte is dropped.
pub fn pcm16_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode audio as a canonical 44-byte-header RIFF/WAVE file.
pub fn encode_wav(audio: &SpeechAudio) -> Vec<u8> {
    const BITS_PER_SAMPLE: u16 = 16;
    let block_align = audio.channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = audio.sample_rate * block_align as u32;
    let data_len = (audio.samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&audio.channels.to_le_bytes());
    out.extend_from_slice(&audio.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in &audio.samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

/// Write audio to `path` as a WAV file, creating parent directories.
pub fn write_wav(path: &Path, audio: &SpeechAudio) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, encode_wav(audio))
        .with_context(|| format!("failed to write audio: {}", path.display()))
}
