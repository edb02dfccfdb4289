//! Byte-level audio decoding for native hosts.
//!
//! Browser builds hand decoded f32 samples across the WASM boundary
//! instead (the host's decoder already did the work); this module gives
//! native embedders and tests the same entry point over raw file bytes.
//! WAV is sniffed by its RIFF/WAVE magic, anything else is tried as MP3.

use std::io::Cursor;

use crate::dsp::buffer::SampleBuffer;
use crate::error::DecodeError;

/// Decode an uploaded file's bytes into a sample buffer.
pub fn decode_audio(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyFile);
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        decode_wav(bytes)
    } else {
        decode_mp3(bytes)
    }
}

fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|e| {
        DecodeError::CorruptStream {
            detail: e.to_string(),
        }
    })?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(DecodeError::NoChannels);
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| DecodeError::CorruptStream {
                detail: e.to_string(),
            })?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::CorruptStream {
                    detail: e.to_string(),
                })?
        }
    };

    SampleBuffer::from_interleaved(&samples, spec.channels as usize, spec.sample_rate)
}

fn decode_mp3(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
    let mut interleaved: Vec<f32> = Vec::new();
    let mut layout: Option<(usize, u32)> = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let frame_layout = (frame.channels, frame.sample_rate as u32);
                match layout {
                    None => layout = Some(frame_layout),
                    Some(expected) if expected != frame_layout => {
                        return Err(DecodeError::CorruptStream {
                            detail: "channel or rate change mid-stream".to_string(),
                        });
                    }
                    Some(_) => {}
                }
                interleaved.extend(frame.data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => {
                return Err(DecodeError::CorruptStream {
                    detail: format!("mp3 decode failed: {e:?}"),
                });
            }
        }
    }

    match layout {
        // No decodable frame at all: not an MP3 (and not a WAV either).
        None => Err(DecodeError::UnsupportedFormat),
        Some((channels, sample_rate)) => {
            SampleBuffer::from_interleaved(&interleaved, channels, sample_rate)
        }
    }
}
