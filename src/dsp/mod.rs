//! DSP core — pure Rust signal routing and rendering.
//!
//! The same code powers the live editor path (via AudioWorklet + WASM)
//! and the offline WAV mixdown, so mute/solo semantics and the band
//! topology can never drift between what the user hears and what they
//! download.

pub mod buffer;
pub mod convolution;
pub mod filter;
pub mod gain;
pub mod graph;
pub mod renderer;
pub mod reverb;
pub mod transport;
