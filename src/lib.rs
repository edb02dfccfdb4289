pub mod dsp;
pub mod error;
pub mod session;
pub mod track;

#[cfg(feature = "codecs")]
pub mod decode;
#[cfg(feature = "suggest")]
pub mod suggest;

use wasm_bindgen::prelude::*;

use crate::dsp::buffer::SampleBuffer;
use crate::session::RemixSession;
use crate::track::Track;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the bandmix-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the four default frequency-band tracks.
#[wasm_bindgen]
pub fn default_tracks() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&track::default_tracks())
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: apply one track edit as a pure transformation,
/// enforcing solo exclusivity, and return the new track list.
#[wasm_bindgen]
pub fn apply_track_update(tracks: JsValue, update: JsValue) -> Result<JsValue, JsValue> {
    let tracks: Vec<Track> =
        serde_wasm_bindgen::from_value(tracks).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let update: Track =
        serde_wasm_bindgen::from_value(update).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&track::apply_track_update(&tracks, update))
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: resolve effective per-track dry/wet and master gains
/// under the mute/solo rule, the same resolution both audio paths use.
#[wasm_bindgen]
pub fn resolve_mix_levels(tracks: JsValue, master_volume: u32) -> Result<JsValue, JsValue> {
    let tracks: Vec<Track> =
        serde_wasm_bindgen::from_value(tracks).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    serde_wasm_bindgen::to_value(&track::resolve_levels(&tracks, master_volume))
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render the mix offline and return WAV bytes.
/// `samples` is interleaved f32 as decoded by the host.
#[wasm_bindgen]
pub fn render_remix_wav(
    samples: &[f32],
    channel_count: usize,
    sample_rate: u32,
    tracks: JsValue,
    master_volume: u32,
) -> Result<Vec<u8>, JsValue> {
    let tracks: Vec<Track> =
        serde_wasm_bindgen::from_value(tracks).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let buffer = SampleBuffer::from_interleaved(samples, channel_count, sample_rate)
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    dsp::renderer::render_remix_wav(&buffer, &tracks, master_volume)
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: download name for the rendered artifact.
#[wasm_bindgen]
pub fn remix_file_name(original: &str) -> String {
    dsp::renderer::remix_file_name(original)
}

/// WASM-exposed live session: the editor's audio core, driven from an
/// AudioWorklet. One instance per loaded file; dropping it (or letting
/// the JS handle be freed) releases every audio node it owns.
#[wasm_bindgen]
pub struct LiveSession {
    inner: RemixSession,
}

#[wasm_bindgen]
impl LiveSession {
    /// Open a session over host-decoded interleaved samples.
    #[wasm_bindgen(constructor)]
    pub fn new(
        samples: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<LiveSession, JsValue> {
        let buffer = SampleBuffer::from_interleaved(samples, channel_count, sample_rate)
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(LiveSession {
            inner: RemixSession::new(buffer),
        })
    }

    pub fn tracks(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.tracks())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Apply one track edit and ramp the live gains toward it.
    pub fn update_track(&mut self, update: JsValue) -> Result<(), JsValue> {
        let update: Track = serde_wasm_bindgen::from_value(update)
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.inner.update_track(update);
        Ok(())
    }

    pub fn set_master_volume(&mut self, volume: u32) {
        self.inner.set_master_volume(volume);
    }

    /// Play/pause button. Returns whether playback is now running.
    pub fn toggle_playback(&mut self) -> bool {
        self.inner.toggle_playback()
    }

    pub fn stop(&mut self) {
        self.inner.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    /// Fill an interleaved output buffer (the AudioWorklet render quantum).
    pub fn process(&mut self, output: &mut [f32]) {
        self.inner.process_into(output);
    }

    /// Render the current mix to WAV bytes on an independent graph.
    pub fn render_wav(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .render_wav()
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }
}
