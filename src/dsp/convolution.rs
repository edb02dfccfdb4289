//! Partitioned FFT convolution.
//!
//! Uniform-partition overlap-save with a frequency-delay line: the
//! impulse response is split into equal blocks, each transformed once,
//! and every input block is multiplied against the whole partition set
//! in the frequency domain. Costs one block of latency and a constant
//! amount of work per sample regardless of impulse length, which is
//! what makes a two-second reverb kernel affordable.

use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

/// Streaming convolver for one channel.
pub struct PartitionedConvolver {
    block: usize,
    fft_size: usize,
    fwd: Arc<dyn RealToComplex<f32>>,
    inv: Arc<dyn ComplexToReal<f32>>,
    /// Impulse partitions in the frequency domain.
    partitions: Vec<Vec<Complex<f32>>>,
    /// Ring of the most recent input-block spectra, newest at `history_pos`.
    history: Vec<Vec<Complex<f32>>>,
    history_pos: usize,
    /// Previous input block; the FFT window is [previous, current].
    prev_block: Vec<f32>,
    cur_block: Vec<f32>,
    fill: usize,
    /// Output of the last completed block, consumed sample by sample.
    out_block: Vec<f32>,
    time_scratch: Vec<f32>,
    acc: Vec<Complex<f32>>,
}

impl PartitionedConvolver {
    /// Build a convolver for `impulse` using `block`-sample partitions.
    /// An empty impulse yields a convolver that outputs silence.
    pub fn new(impulse: &[f32], block: usize) -> Self {
        let block = block.max(1);
        let fft_size = block * 2;
        let bins = block + 1;

        let mut planner = RealFftPlanner::<f32>::new();
        let fwd = planner.plan_fft_forward(fft_size);
        let inv = planner.plan_fft_inverse(fft_size);

        let partition_count = impulse.len().div_ceil(block).max(1);
        let mut partitions = Vec::with_capacity(partition_count);
        let mut padded = vec![0.0f32; fft_size];
        for p in 0..partition_count {
            padded.fill(0.0);
            let start = p * block;
            let end = (start + block).min(impulse.len());
            if start < impulse.len() {
                padded[..end - start].copy_from_slice(&impulse[start..end]);
            }
            let mut spectrum = vec![Complex::new(0.0, 0.0); bins];
            fwd.process(&mut padded, &mut spectrum).ok();
            partitions.push(spectrum);
        }

        PartitionedConvolver {
            block,
            fft_size,
            fwd,
            inv,
            history: vec![vec![Complex::new(0.0, 0.0); bins]; partition_count],
            history_pos: 0,
            partitions,
            prev_block: vec![0.0; block],
            cur_block: vec![0.0; block],
            fill: 0,
            out_block: vec![0.0; block],
            time_scratch: vec![0.0; fft_size],
            acc: vec![Complex::new(0.0, 0.0); bins],
        }
    }

    /// Samples of delay between input and the convolved output.
    pub fn latency(&self) -> usize {
        self.block
    }

    /// Push one input sample, pull one output sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.cur_block[self.fill] = input;
        let output = self.out_block[self.fill];
        self.fill += 1;
        if self.fill == self.block {
            self.advance_block();
            self.fill = 0;
        }
        output
    }

    /// FFT the completed block, multiply-accumulate against every
    /// partition, and keep the valid (overlap-save) half of the result.
    fn advance_block(&mut self) {
        let block = self.block;
        self.time_scratch[..block].copy_from_slice(&self.prev_block);
        self.time_scratch[block..].copy_from_slice(&self.cur_block);

        self.history_pos = (self.history_pos + 1) % self.history.len();
        self.fwd
            .process(&mut self.time_scratch, &mut self.history[self.history_pos])
            .ok();

        self.acc.fill(Complex::new(0.0, 0.0));
        let count = self.partitions.len();
        for (age, partition) in self.partitions.iter().enumerate() {
            let spectrum = &self.history[(self.history_pos + count - age) % count];
            for ((acc, x), h) in self.acc.iter_mut().zip(spectrum).zip(partition) {
                *acc += x * h;
            }
        }
        // DC and Nyquist bins of a real spectrum product stay real.
        self.acc[0].im = 0.0;
        self.acc[block].im = 0.0;

        self.inv.process(&mut self.acc, &mut self.time_scratch).ok();

        let scale = 1.0 / self.fft_size as f32;
        for (out, &raw) in self.out_block.iter_mut().zip(&self.time_scratch[block..]) {
            *out = raw * scale;
        }

        std::mem::swap(&mut self.prev_block, &mut self.cur_block);
    }

    /// Clear all signal state; the impulse partitions are kept.
    pub fn reset(&mut self) {
        for spectrum in &mut self.history {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.history_pos = 0;
        self.prev_block.fill(0.0);
        self.cur_block.fill(0.0);
        self.out_block.fill(0.0);
        self.fill = 0;
    }
}
