//! Offline mixdown — drives a render graph across the full buffer and
//! encodes the result to a WAV byte stream (16-bit stereo-or-wider PCM).

use crate::dsp::buffer::SampleBuffer;
use crate::dsp::graph::{GraphMode, RemixGraph};
use crate::error::RenderError;
use crate::track::Track;

/// Render the remix non-interactively: a fresh render graph (own reverb
/// kernel, levels resolved once, no ramping) driven over exactly the
/// buffer's length. The reverb tail past the last frame is truncated,
/// matching the length-bounded offline context of the original.
pub fn render_remix(
    buffer: &SampleBuffer,
    tracks: &[Track],
    master_volume: u32,
) -> Result<Vec<Vec<f32>>, RenderError> {
    if buffer.is_empty() {
        return Err(RenderError::EmptyBuffer);
    }

    let channels = buffer.channel_count();
    let frames = buffer.frames();
    let mut graph = RemixGraph::build(
        tracks,
        master_volume,
        buffer.sample_rate(),
        channels,
        GraphMode::Render,
    );

    let mut output = vec![vec![0.0f32; frames]; channels];
    graph.process_block(buffer, 0, &mut output);

    log::debug!("rendered {frames} frames × {channels} channels offline");
    Ok(output)
}

/// Render and encode in one step.
pub fn render_remix_wav(
    buffer: &SampleBuffer,
    tracks: &[Track],
    master_volume: u32,
) -> Result<Vec<u8>, RenderError> {
    let rendered = render_remix(buffer, tracks, master_volume)?;
    Ok(encode_wav_pcm16(&rendered, buffer.sample_rate()))
}

/// Encode planar f32 audio as a RIFF/WAVE byte buffer: a 44-byte header
/// followed by interleaved 16-bit signed little-endian PCM. Each sample
/// is clamped to [-1, 1], scaled by 32767 (positive) or 32768
/// (negative), and truncated. Total length is exactly
/// `44 + frames × channels × 2` bytes.
pub fn encode_wav_pcm16(channels: &[Vec<f32>], sample_rate: u32) -> Vec<u8> {
    let channel_count = channels.len() as u16;
    let frames = channels.first().map_or(0, Vec::len);
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * 2 * channel_count as u32;
    let block_align = channel_count * 2;
    let data_size = (frames * channel_count as usize * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channel_count.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for frame in 0..frames {
        for channel in channels {
            let sample = channel[frame].clamp(-1.0, 1.0);
            let scaled = if sample < 0.0 {
                sample * 32768.0
            } else {
                sample * 32767.0
            };
            buf.extend_from_slice(&(scaled as i16).to_le_bytes());
        }
    }

    buf
}

/// Download name for the rendered artifact: the original file name with
/// its final extension stripped and `_remix.wav` appended.
pub fn remix_file_name(original: &str) -> String {
    let base = match original.rfind('.') {
        Some(idx) if !original[idx + 1..].is_empty() && !original[idx + 1..].contains(['.', '/']) => {
            &original[..idx]
        }
        _ => original,
    };
    format!("{base}_remix.wav")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::default_tracks;

    fn tone_buffer(frames: usize, channels: usize, sample_rate: u32) -> SampleBuffer {
        let data: Vec<Vec<f32>> = (0..channels)
            .map(|c| {
                (0..frames)
                    .map(|i| {
                        let t = i as f64 / sample_rate as f64;
                        ((2.0 * std::f64::consts::PI * 220.0 * t).sin() * 0.5) as f32
                            * if c % 2 == 0 { 1.0 } else { -1.0 }
                    })
                    .collect()
            })
            .collect();
        SampleBuffer::new(data, sample_rate).unwrap()
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode_wav_pcm16(&[vec![0.0; 100], vec![0.0; 100]], 44100);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let fmt_len = u32::from_le_bytes([wav[16], wav[17], wav[18], wav[19]]);
        assert_eq!(fmt_len, 16);
        let format_tag = u16::from_le_bytes([wav[20], wav[21]]);
        assert_eq!(format_tag, 1, "linear PCM integer");
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);
        let byte_rate = u32::from_le_bytes([wav[28], wav[29], wav[30], wav[31]]);
        assert_eq!(byte_rate, 44100 * 2 * 2);
        let block_align = u16::from_le_bytes([wav[32], wav[33]]);
        assert_eq!(block_align, 4);
        let bits = u16::from_le_bytes([wav[34], wav[35]]);
        assert_eq!(bits, 16);
    }

    #[test]
    fn wav_length_formula_holds() {
        for (frames, channels) in [(0usize, 1usize), (10, 2), (441, 1), (1000, 6)] {
            let data = vec![vec![0.0f32; frames]; channels];
            let wav = encode_wav_pcm16(&data, 44100);
            assert_eq!(
                wav.len(),
                44 + frames * channels * 2,
                "{frames} frames × {channels} channels"
            );
        }
    }

    #[test]
    fn zero_buffer_scenario() {
        // 2 channels, 44100 Hz, 10 zero frames: 40 zero data bytes and
        // a chunk-size field covering them.
        let wav = encode_wav_pcm16(&[vec![0.0; 10], vec![0.0; 10]], 44100);

        assert_eq!(wav.len(), 84);
        let riff_size = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]);
        assert_eq!(riff_size, 84 - 8);
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 40);
        assert!(wav[44..].iter().all(|&b| b == 0));
    }

    #[test]
    fn encoding_is_idempotent() {
        let buffer = tone_buffer(500, 2, 22050);
        let channels: Vec<Vec<f32>> = (0..2).map(|c| buffer.channel(c).to_vec()).collect();
        assert_eq!(
            encode_wav_pcm16(&channels, 22050),
            encode_wav_pcm16(&channels, 22050)
        );
    }

    #[test]
    fn sample_scaling_and_clamping() {
        let wav = encode_wav_pcm16(&[vec![1.0, -1.0, 1.5, -2.0, 0.5, -0.5, 0.0]], 44100);
        let samples: Vec<i16> = wav[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(samples, vec![32767, -32768, 32767, -32768, 16383, -16384, 0]);
    }

    #[test]
    fn interleaving_order_is_frame_major() {
        let wav = encode_wav_pcm16(&[vec![0.25, 0.5], vec![-0.25, -0.5]], 8000);
        let samples: Vec<i16> = wav[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        // L0 R0 L1 R1
        assert_eq!(samples[0], (0.25f32 * 32767.0) as i16);
        assert_eq!(samples[1], (-0.25f32 * 32768.0) as i16);
        assert_eq!(samples[2], (0.5f32 * 32767.0) as i16);
        assert_eq!(samples[3], (-0.5f32 * 32768.0) as i16);
    }

    #[test]
    fn hound_reads_our_wav_back() {
        let buffer = tone_buffer(300, 2, 44100);
        let channels: Vec<Vec<f32>> = (0..2).map(|c| buffer.channel(c).to_vec()).collect();
        let wav = encode_wav_pcm16(&channels, 44100);

        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        assert_eq!(reader.len(), 600);
    }

    #[test]
    fn render_produces_full_length_output() {
        let buffer = tone_buffer(2000, 2, 8000);
        let rendered = render_remix(&buffer, &default_tracks(), 80).unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].len(), 2000);
        let energy: f64 = rendered
            .iter()
            .flat_map(|c| c.iter())
            .map(|&s| (s as f64).abs())
            .sum();
        assert!(energy > 0.0, "default mix must not render silence");
    }

    #[test]
    fn render_rejects_empty_buffer() {
        let buffer = SampleBuffer::new(vec![vec![], vec![]], 44100).unwrap();
        assert!(matches!(
            render_remix(&buffer, &default_tracks(), 80),
            Err(RenderError::EmptyBuffer)
        ));
    }

    #[test]
    fn rendered_wav_is_complete() {
        let buffer = tone_buffer(1000, 2, 8000);
        let wav = render_remix_wav(&buffer, &default_tracks(), 80).unwrap();
        assert_eq!(wav.len(), 44 + 1000 * 2 * 2);
        assert_eq!(&wav[0..4], b"RIFF");

        // With all reverb sends at zero the mix is audible dry signal.
        let nonzero = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(nonzero, "rendered WAV should contain non-silent audio");
    }

    #[test]
    fn download_name_strips_one_extension() {
        assert_eq!(remix_file_name("song.mp3"), "song_remix.wav");
        assert_eq!(remix_file_name("my.track.flac"), "my.track_remix.wav");
        assert_eq!(remix_file_name("noext"), "noext_remix.wav");
        assert_eq!(remix_file_name("trailing."), "trailing._remix.wav");
        assert_eq!(remix_file_name(".mp3"), "_remix.wav");
    }
}
