//! Uniformly partitioned FFT convolution.

/*
Partitioned Convolution
=======================

Convolving with a two-second impulse response directly costs ~100k
multiplies per output sample. Doing it in the frequency domain is far
cheaper, but one giant FFT would add seconds of latency. The compromise is
to cut the impulse response into equal partitions of B samples and convolve
each partition with the input in the frequency domain.

Vocabulary
----------

  partition   B consecutive samples of the impulse response, zero-padded
              to 2B and transformed once at construction.

  FDL         Frequency-domain delay line: the spectra of the last P input
              blocks. Slot p is convolved with partition p, so older input
              meets later parts of the tail.

  overlap-    Each block FFT covers [previous B | current B] input samples.
  save        After multiplying and inverse-transforming, the first half is
              circular wrap-around garbage and the second half is exactly B
              samples of linear convolution output.


One Block
---------

    input block ─▶ [prev | cur] ─▶ FFT ─▶ FDL[head]
                                           │
           Σ_p FDL[head - p] × H[p]  ◀─────┘
                     │
                    IFFT ─▶ keep second half ─▶ next B output samples

Latency is exactly one partition (B samples). All buffers are allocated in
`new`; `process` only runs `process_with_scratch`, so it is realtime safe.

Real input has conjugate-symmetric spectra, so only bins 0..=B are
accumulated and the upper half is mirrored.
*/

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

pub const PARTITION_SIZE: usize = 256;

pub struct PartitionedConvolver {
    block: usize,
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    partitions: Vec<Vec<Complex<f32>>>,
    fdl: Vec<Vec<Complex<f32>>>,
    head: usize,
    history: Vec<f32>,
    output: Vec<f32>,
    fill: usize,
    work: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl PartitionedConvolver {
    pub fn new(impulse: &[f32]) -> Self {
        Self::with_partition_size(impulse, PARTITION_SIZE)
    }

    pub fn with_partition_size(impulse: &[f32], block: usize) -> Self {
        let block = block.max(1);
        let size = block * 2;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        let count = impulse.len().div_ceil(block).max(1);
        let mut partitions = Vec::with_capacity(count);
        for p in 0..count {
            let mut spectrum = vec![Complex::new(0.0, 0.0); size];
            let start = p * block;
            let end = (start + block).min(impulse.len());
            for (slot, &tap) in spectrum.iter_mut().zip(impulse.get(start..end).unwrap_or(&[])) {
                slot.re = tap;
            }
            fft.process_with_scratch(&mut spectrum, &mut scratch);
            partitions.push(spectrum);
        }

        Self {
            block,
            fft,
            ifft,
            fdl: vec![vec![Complex::new(0.0, 0.0); size]; count],
            partitions,
            head: 0,
            history: vec![0.0; size],
            output: vec![0.0; block],
            fill: 0,
            work: vec![Complex::new(0.0, 0.0); size],
            accum: vec![Complex::new(0.0, 0.0); size],
            scratch,
        }
    }

    /// Processing latency in samples.
    pub fn latency(&self) -> usize {
        self.block
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Convolve `input` into `output` (same length, may be any length).
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());

        for (x, y) in input.iter().zip(output.iter_mut()) {
            self.history[self.block + self.fill] = *x;
            *y = self.output[self.fill];
            self.fill += 1;
            if self.fill == self.block {
                self.fill = 0;
                self.compute_block();
            }
        }
    }

    fn compute_block(&mut self) {
        let size = self.block * 2;

        for (w, &h) in self.work.iter_mut().zip(self.history.iter()) {
            *w = Complex::new(h, 0.0);
        }
        self.fft.process_with_scratch(&mut self.work, &mut self.scratch);
        self.fdl[self.head].copy_from_slice(&self.work);

        let count = self.partitions.len();
        let half = self.block;
        self.accum.fill(Complex::new(0.0, 0.0));
        for (p, partition) in self.partitions.iter().enumerate() {
            let slot = &self.fdl[(self.head + count - p) % count];
            for k in 0..=half {
                self.accum[k] += slot[k] * partition[k];
            }
        }
        for k in 1..half {
            self.accum[size - k] = self.accum[k].conj();
        }

        self.ifft.process_with_scratch(&mut self.accum, &mut self.scratch);

        let norm = 1.0 / size as f32;
        for (out, bin) in self.output.iter_mut().zip(self.accum[half..].iter()) {
            *out = bin.re * norm;
        }

        self.head = (self.head + 1) % count;
        self.history.copy_within(half.., 0);
    }

    pub fn reset(&mut self) {
        for slot in &mut self.fdl {
            slot.fill(Complex::new(0.0, 0.0));
        }
        self.history.fill(0.0);
        self.output.fill(0.0);
        self.fill = 0;
        self.head = 0;
    }
}
