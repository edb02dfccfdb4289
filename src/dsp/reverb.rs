//! Shared reverb — synthesized impulse kernel plus its convolver bank.
//!
//! The kernel is a two-channel burst of uniform noise shaped by a
//! steep polynomial decay: dense at the front, sparse at the tail. An
//! approximation of a reverberant space, not a measured response. Every
//! graph instance generates its own kernel; it is never mutated after
//! creation.

use rand::Rng;

use super::convolution::PartitionedConvolver;

/// Kernel length in seconds.
pub const KERNEL_DURATION_SECS: f64 = 2.0;
/// Decay exponent applied to the noise envelope.
pub const KERNEL_DECAY: f64 = 5.0;
/// Kernels are always stereo, whatever the graph channel count.
pub const KERNEL_CHANNELS: usize = 2;
/// Partition size used by the reverb convolvers.
pub const REVERB_BLOCK: usize = 256;

/// A generated impulse-response buffer.
#[derive(Debug, Clone)]
pub struct ReverbKernel {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl ReverbKernel {
    /// Fill `KERNEL_CHANNELS` channels of `KERNEL_DURATION_SECS` worth of
    /// decaying noise: `noise × (1 - i/len)^KERNEL_DECAY`. The noise
    /// source is deliberately unseeded; tests assert the envelope, not
    /// exact samples.
    pub fn generate(sample_rate: u32) -> Self {
        let len = (KERNEL_DURATION_SECS * sample_rate as f64) as usize;
        let mut rng = rand::rng();

        let channels = (0..KERNEL_CHANNELS)
            .map(|_| {
                (0..len)
                    .map(|i| {
                        let noise: f32 = rng.random_range(-1.0..1.0);
                        let envelope = (1.0 - i as f64 / len as f64).powf(KERNEL_DECAY);
                        noise * envelope as f32
                    })
                    .collect()
            })
            .collect();

        ReverbKernel {
            channels,
            sample_rate,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Kernel channel for a graph channel; mono-ish graphs reuse the
    /// last kernel channel, matching WebAudio's convolver up-mix.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index.min(self.channels.len() - 1)]
    }
}

/// One partitioned convolver per graph channel, all fed from the same
/// wet bus and sharing one kernel.
pub struct ConvolutionReverb {
    convolvers: Vec<PartitionedConvolver>,
}

impl ConvolutionReverb {
    pub fn new(kernel: &ReverbKernel, channel_count: usize) -> Self {
        let convolvers = (0..channel_count)
            .map(|c| PartitionedConvolver::new(kernel.channel(c), REVERB_BLOCK))
            .collect();
        ConvolutionReverb { convolvers }
    }

    /// Convolve one wet-bus sample for the given channel.
    #[inline]
    pub fn process(&mut self, channel: usize, input: f32) -> f32 {
        self.convolvers[channel].process(input)
    }

    pub fn latency(&self) -> usize {
        self.convolvers.first().map_or(0, PartitionedConvolver::latency)
    }

    pub fn reset(&mut self) {
        for convolver in &mut self.convolvers {
            convolver.reset();
        }
    }
}
