//! Playback transport.
//!
//! Exactly one active playback pass at a time: starting playback while
//! already playing stops the previous pass first (toggle semantics,
//! never layering), and running off the end of the buffer resets to
//! `Stopped` without an explicit stop.

use crate::dsp::buffer::SampleBuffer;
use crate::dsp::graph::RemixGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Drives the live graph across the sample buffer. Playback always
/// starts from frame zero, as the original's one-shot source does.
#[derive(Debug)]
pub struct Transport {
    state: PlaybackState,
    position: usize,
    /// How many playback passes have ever been started. Diagnostic
    /// counter used to verify the no-overlap invariant.
    passes_started: u64,
}

impl Transport {
    pub fn new() -> Self {
        Transport {
            state: PlaybackState::Stopped,
            position: 0,
            passes_started: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Current read position in frames.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn passes_started(&self) -> u64 {
        self.passes_started
    }

    /// Start a fresh pass from the beginning. An active pass is
    /// replaced, never layered.
    pub fn play(&mut self) {
        self.position = 0;
        self.state = PlaybackState::Playing;
        self.passes_started += 1;
    }

    /// Hard stop: discard the active pass and rewind.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.position = 0;
    }

    /// Play/pause button semantics. Returns whether playback is now
    /// running.
    pub fn toggle(&mut self) -> bool {
        match self.state {
            PlaybackState::Playing => {
                self.stop();
                false
            }
            PlaybackState::Stopped => {
                self.play();
                true
            }
        }
    }

    /// Produce `output[0].len()` frames. While stopped the output is
    /// silence; while playing the graph is driven from the current
    /// position, and exhausting the buffer flips to `Stopped` with the
    /// graph state cleared, ready for the next pass.
    pub fn process_block(
        &mut self,
        graph: &mut RemixGraph,
        buffer: &SampleBuffer,
        output: &mut [Vec<f32>],
    ) {
        if self.state == PlaybackState::Stopped {
            for channel in output.iter_mut() {
                channel.fill(0.0);
            }
            return;
        }

        graph.process_block(buffer, self.position, output);
        self.position += output.first().map_or(0, Vec::len);

        if self.position >= buffer.frames() {
            self.stop();
            graph.reset();
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::graph::GraphMode;
    use crate::track::default_tracks;

    const RATE: u32 = 8000;

    fn setup(frames: usize) -> (Transport, RemixGraph, SampleBuffer) {
        let buffer = SampleBuffer::new(vec![vec![0.25; frames]], RATE).unwrap();
        let graph = RemixGraph::build(&default_tracks(), 80, RATE, 1, GraphMode::Live);
        (Transport::new(), graph, buffer)
    }

    #[test]
    fn starts_stopped() {
        let t = Transport::new();
        assert_eq!(t.state(), PlaybackState::Stopped);
        assert!(!t.is_playing());
        assert_eq!(t.position(), 0);
    }

    #[test]
    fn toggle_flips_between_states() {
        let mut t = Transport::new();
        assert!(t.toggle());
        assert!(t.is_playing());
        assert!(!t.toggle());
        assert!(!t.is_playing());
    }

    #[test]
    fn play_twice_replaces_the_active_pass() {
        let (mut t, mut graph, buffer) = setup(4096);

        t.play();
        let mut out = vec![vec![0.0f32; 512]];
        t.process_block(&mut graph, &buffer, &mut out);
        assert_eq!(t.position(), 512);

        // Second play without a stop: still exactly one pass running,
        // restarted from the top.
        t.play();
        assert!(t.is_playing());
        assert_eq!(t.position(), 0, "replacement pass restarts from frame 0");
        assert_eq!(t.passes_started(), 2);
    }

    #[test]
    fn stopped_transport_outputs_silence() {
        let (mut t, mut graph, buffer) = setup(4096);
        let mut out = vec![vec![0.5f32; 256]];
        t.process_block(&mut graph, &buffer, &mut out);
        assert!(out[0].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn natural_end_resets_to_stopped() {
        let (mut t, mut graph, buffer) = setup(1000);
        t.play();

        let mut out = vec![vec![0.0f32; 512]];
        t.process_block(&mut graph, &buffer, &mut out);
        assert!(t.is_playing());

        t.process_block(&mut graph, &buffer, &mut out);
        assert!(
            !t.is_playing(),
            "running off the buffer end must stop without an explicit stop()"
        );
        assert_eq!(t.position(), 0);
    }

    #[test]
    fn stop_rewinds() {
        let (mut t, mut graph, buffer) = setup(4096);
        t.play();
        let mut out = vec![vec![0.0f32; 256]];
        t.process_block(&mut graph, &buffer, &mut out);
        t.stop();
        assert_eq!(t.position(), 0);
        assert!(!t.is_playing());
    }
}
