//! Decoded audio storage.
//!
//! A [`SampleBuffer`] is the immutable, sample-rate-tagged result of
//! decoding the uploaded file. It is created once per file selection and
//! shared read-only by the live and render graphs.

use crate::error::DecodeError;

/// Planar multi-channel f32 audio, immutable after construction.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build from planar channel data. All channels must share one length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, DecodeError> {
        if channels.is_empty() {
            return Err(DecodeError::NoChannels);
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(DecodeError::CorruptStream {
                detail: "channels of unequal length".to_string(),
            });
        }
        Ok(SampleBuffer {
            channels,
            sample_rate,
        })
    }

    /// Build from interleaved f32 samples (the layout WebAudio hosts hand
    /// across the WASM boundary).
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, DecodeError> {
        if channel_count == 0 {
            return Err(DecodeError::NoChannels);
        }
        if !samples.len().is_multiple_of(channel_count) {
            return Err(DecodeError::CorruptStream {
                detail: format!(
                    "{} samples do not divide into {channel_count} channels",
                    samples.len()
                ),
            });
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        SampleBuffer::new(channels, sample_rate)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Borrow one channel's samples.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }
}
