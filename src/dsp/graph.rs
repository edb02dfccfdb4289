//! The remix signal graph.
//!
//! One band filter per track splits into a dry path (volume gain, into
//! the master) and a wet path (reverb send, into the shared convolution
//! kernel, into the master). The master feeds the output destination.
//! A single builder serves both destinations: the live graph ramps its
//! gains click-free, the render graph is parameterized once and snaps.
//! Both resolve their levels through [`resolve_levels`], so the two
//! paths cannot drift apart.

use crate::dsp::buffer::SampleBuffer;
use crate::dsp::filter::BiquadFilter;
use crate::dsp::gain::SmoothedGain;
use crate::dsp::reverb::{ConvolutionReverb, ReverbKernel};
use crate::track::{resolve_levels, Track};

/// Which destination a graph drives: audible playback or the offline
/// mixdown accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMode {
    Live,
    Render,
}

/// Filter stage plus the two gain stages for one track. Owned
/// exclusively by the graph that built it.
struct TrackChain {
    id: u32,
    /// One biquad per channel; all channels share the band design.
    filters: Vec<BiquadFilter>,
    dry: SmoothedGain,
    wet: SmoothedGain,
}

/// A fully wired signal-routing topology over one sample buffer shape.
/// Dropping the graph releases every node it owns.
pub struct RemixGraph {
    mode: GraphMode,
    channel_count: usize,
    chains: Vec<TrackChain>,
    reverb: ConvolutionReverb,
    master: SmoothedGain,
    /// Per-frame (dry, wet) gain values, recomputed before the channel loop.
    gain_scratch: Vec<(f32, f32)>,
}

impl RemixGraph {
    /// Wire one chain per track, in track order, against a fresh reverb
    /// kernel. Initial gain values are the resolved targets at build
    /// time, exactly as both the live and offline contexts of the
    /// original initialize their nodes.
    pub fn build(
        tracks: &[Track],
        master_volume: u32,
        sample_rate: u32,
        channel_count: usize,
        mode: GraphMode,
    ) -> Self {
        let levels = resolve_levels(tracks, master_volume);
        let rate = sample_rate as f64;

        let chains = tracks
            .iter()
            .zip(&levels.tracks)
            .map(|(track, level)| TrackChain {
                id: track.id,
                filters: (0..channel_count)
                    .map(|_| {
                        BiquadFilter::new(
                            track.filter_type,
                            track.filter_freq,
                            track.filter_q,
                            rate,
                        )
                    })
                    .collect(),
                dry: SmoothedGain::new(level.dry, rate),
                wet: SmoothedGain::new(level.wet, rate),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "built {mode:?} graph: {} tracks × {channel_count} channels at {sample_rate} Hz",
            chains.len()
        );

        RemixGraph {
            mode,
            channel_count,
            reverb: ConvolutionReverb::new(&ReverbKernel::generate(sample_rate), channel_count),
            master: SmoothedGain::new(levels.master, rate),
            gain_scratch: vec![(0.0, 0.0); chains.len()],
            chains,
        }
    }

    pub fn mode(&self) -> GraphMode {
        self.mode
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Re-resolve every effective level and retarget the gains. Live
    /// graphs ramp; render graphs snap (nothing audible to click).
    pub fn sync_params(&mut self, tracks: &[Track], master_volume: u32) {
        let levels = resolve_levels(tracks, master_volume);
        for (chain, level) in self.chains.iter_mut().zip(&levels.tracks) {
            debug_assert_eq!(chain.id, level.id);
            match self.mode {
                GraphMode::Live => {
                    chain.dry.set_target(level.dry);
                    chain.wet.set_target(level.wet);
                }
                GraphMode::Render => {
                    chain.dry.snap_to(level.dry);
                    chain.wet.snap_to(level.wet);
                }
            }
        }
        match self.mode {
            GraphMode::Live => self.master.set_target(levels.master),
            GraphMode::Render => self.master.snap_to(levels.master),
        }
    }

    /// Run the topology over `output[0].len()` frames, reading the
    /// source at `start_frame`. Every track reads the same input frame,
    /// so summation stays sample-aligned; gains advance once per frame.
    /// Frames past the end of the buffer read as silence (the reverb
    /// tail keeps flowing).
    pub fn process_block(
        &mut self,
        input: &SampleBuffer,
        start_frame: usize,
        output: &mut [Vec<f32>],
    ) {
        debug_assert_eq!(output.len(), self.channel_count);
        let frames = output.first().map_or(0, Vec::len);
        let input_frames = input.frames();

        for i in 0..frames {
            let src = start_frame + i;
            let master_gain = self.master.next() as f32;
            for (chain, slot) in self.chains.iter_mut().zip(self.gain_scratch.iter_mut()) {
                *slot = (chain.dry.next() as f32, chain.wet.next() as f32);
            }

            for c in 0..self.channel_count {
                let x = if src < input_frames {
                    input.channel(c)[src]
                } else {
                    0.0
                };

                let mut dry_sum = 0.0f32;
                let mut wet_bus = 0.0f32;
                for (chain, &(dry, wet)) in self.chains.iter_mut().zip(self.gain_scratch.iter()) {
                    let filtered = chain.filters[c].process(x);
                    dry_sum += filtered * dry;
                    wet_bus += filtered * wet;
                }

                let wet_out = self.reverb.process(c, wet_bus);
                output[c][i] = (dry_sum + wet_out) * master_gain;
            }
        }
    }

    /// Clear all signal state (filters and reverb tail). Gain levels are
    /// kept; this is the hard-stop path, not a rebuild.
    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            for filter in &mut chain.filters {
                filter.reset();
            }
        }
        self.reverb.reset();
    }
}
