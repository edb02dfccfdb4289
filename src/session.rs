//! Editor session — the stateful core behind the editor screen.
//!
//! Owns the decoded sample buffer, the track records, the live signal
//! graph, and the transport. Every user edit funnels through the pure
//! track-update rules and is then ramped into the live graph; the
//! offline render builds its own graph and leaves live state untouched.
//! Dropping the session releases every audio node it owns.

use crate::dsp::buffer::SampleBuffer;
use crate::dsp::graph::{GraphMode, RemixGraph};
use crate::dsp::renderer;
use crate::dsp::transport::Transport;
use crate::error::RenderError;
use crate::track::{apply_track_update, default_tracks, Track};

/// Initial master volume, matching the editor's default slider position.
pub const DEFAULT_MASTER_VOLUME: u32 = 80;

pub struct RemixSession {
    buffer: SampleBuffer,
    tracks: Vec<Track>,
    master_volume: u32,
    graph: RemixGraph,
    transport: Transport,
    /// Planar scratch reused by `process_into`.
    scratch: Vec<Vec<f32>>,
}

impl RemixSession {
    /// Open a session over a decoded buffer with the four default bands.
    pub fn new(buffer: SampleBuffer) -> Self {
        RemixSession::with_tracks(buffer, default_tracks(), DEFAULT_MASTER_VOLUME)
    }

    pub fn with_tracks(buffer: SampleBuffer, tracks: Vec<Track>, master_volume: u32) -> Self {
        let master_volume = master_volume.min(100);
        let graph = RemixGraph::build(
            &tracks,
            master_volume,
            buffer.sample_rate(),
            buffer.channel_count(),
            GraphMode::Live,
        );
        let scratch = vec![Vec::new(); buffer.channel_count()];
        RemixSession {
            buffer,
            tracks,
            master_volume,
            graph,
            transport: Transport::new(),
            scratch,
        }
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn master_volume(&self) -> u32 {
        self.master_volume
    }

    /// Apply one track edit: pure update (with solo exclusivity), then
    /// ramp the live gains toward the newly resolved targets.
    pub fn update_track(&mut self, update: Track) {
        self.tracks = apply_track_update(&self.tracks, update);
        self.graph.sync_params(&self.tracks, self.master_volume);
    }

    pub fn set_master_volume(&mut self, volume: u32) {
        self.master_volume = volume.min(100);
        self.graph.sync_params(&self.tracks, self.master_volume);
    }

    /// Play/pause button. Returns whether playback is now running.
    pub fn toggle_playback(&mut self) -> bool {
        let playing = self.transport.toggle();
        if !playing {
            // Hard stop: silence immediately, drop the tail.
            self.graph.reset();
        }
        playing
    }

    /// Hard stop, regardless of current state.
    pub fn stop(&mut self) {
        if self.transport.is_playing() {
            self.transport.stop();
            self.graph.reset();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    /// Fill an interleaved output buffer for the audio host. The frame
    /// count is `output.len() / channel_count`; a trailing partial frame
    /// is left untouched.
    pub fn process_into(&mut self, output: &mut [f32]) {
        let channels = self.buffer.channel_count();
        let frames = output.len() / channels;

        for channel in &mut self.scratch {
            channel.clear();
            channel.resize(frames, 0.0);
        }
        self.transport
            .process_block(&mut self.graph, &self.buffer, &mut self.scratch);

        for (i, frame) in output.chunks_exact_mut(channels).enumerate() {
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = self.scratch[c][i];
            }
        }
    }

    /// Render the current mix to WAV bytes on an independent render
    /// graph. Live playback state is untouched.
    pub fn render_wav(&self) -> Result<Vec<u8>, RenderError> {
        renderer::render_remix_wav(&self.buffer, &self.tracks, self.master_volume)
    }
}

impl Drop for RemixSession {
    fn drop(&mut self) {
        // Teardown is best-effort: nothing here can fail, and nothing
        // would be surfaced to the user if it did.
        log::debug!("releasing live graph and playback resources");
    }
}
