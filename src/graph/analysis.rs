//! Spectrum and waveform snapshot of the master bus.
//!
//! The audio callback only pushes mono samples into a ring. Everything else
//! (windowing, FFT, smoothing) happens here on the control side, in buffers
//! allocated once.

use std::sync::Arc;

use rtrb::Consumer;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Weight of the previous spectrum in each new one.
pub const DEFAULT_SMOOTHING: f32 = 0.8;

/// Floor reported for silent bins.
pub const MIN_DECIBELS: f32 = -100.0;

/// One analysis snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFrame {
    /// Smoothed magnitude per bin in dB, `fft_size / 2` entries.
    pub frequency_db: Vec<f32>,
    /// Most recent `fft_size` samples, oldest first.
    pub time_domain: Vec<f32>,
    pub sample_rate: u32,
}

impl AnalysisFrame {
    fn silent(fft_size: usize, sample_rate: u32) -> Self {
        Self {
            frequency_db: vec![MIN_DECIBELS; fft_size / 2],
            time_domain: vec![0.0; fft_size],
            sample_rate,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.time_domain.len()
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size() as f32
    }

    /// Loudest bin, ignoring DC.
    pub fn peak_bin(&self) -> Option<usize> {
        self.frequency_db
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| bin)
    }
}

pub struct Analyser {
    rx: Consumer<f32>,
    /// Circular history of the bus; `write` is the oldest sample.
    history: Vec<f32>,
    write: usize,
    /// Hann window - reduces spectral leakage
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    smoothing: f32,
    frame: AnalysisFrame,
}

impl Analyser {
    pub fn new(rx: Consumer<f32>, fft_size: usize, smoothing: f32, sample_rate: u32) -> Self {
        let fft_size = fft_size.max(32);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let denom = (fft_size - 1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        Self {
            rx,
            history: vec![0.0; fft_size],
            write: 0,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()],
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            fft,
            smoothed: vec![0.0; fft_size / 2],
            smoothing: smoothing.clamp(0.0, 1.0),
            frame: AnalysisFrame::silent(fft_size, sample_rate),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.history.len()
    }

    /// Pull whatever the audio thread has pushed and, if anything arrived,
    /// recompute the snapshot. Returns the number of samples consumed.
    pub fn refresh(&mut self) -> usize {
        let mut consumed = 0;
        while let Ok(sample) = self.rx.pop() {
            self.history[self.write] = sample;
            self.write = (self.write + 1) % self.history.len();
            consumed += 1;
        }
        if consumed > 0 {
            self.analyse();
        }
        consumed
    }

    pub fn frame(&self) -> &AnalysisFrame {
        &self.frame
    }

    fn analyse(&mut self) {
        let n = self.history.len();
        let (newest, oldest) = self.history.split_at(self.write);
        let time = &mut self.frame.time_domain;
        time[..oldest.len()].copy_from_slice(oldest);
        time[oldest.len()..].copy_from_slice(newest);

        for ((bin, sample), w) in self.spectrum.iter_mut().zip(time.iter()).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let scale = 1.0 / n as f32;
        let tau = self.smoothing;
        for ((smoothed, db), bin) in self
            .smoothed
            .iter_mut()
            .zip(self.frame.frequency_db.iter_mut())
            .zip(&self.spectrum)
        {
            *smoothed = tau * *smoothed + (1.0 - tau) * bin.norm() * scale;
            *db = if *smoothed > 0.0 {
                (20.0 * smoothed.log10()).max(MIN_DECIBELS)
            } else {
                MIN_DECIBELS
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    const SR: u32 = 48_000;

    #[test]
    fn test_silence_reports_floor() {
        let (_tx, rx) = RingBuffer::<f32>::new(4096);
        let mut analyser = Analyser::new(rx, 1024, DEFAULT_SMOOTHING, SR);
        assert_eq!(analyser.refresh(), 0);
        let frame = analyser.frame();
        assert_eq!(frame.frequency_db.len(), 512);
        assert_eq!(frame.time_domain.len(), 1024);
        assert!(frame.frequency_db.iter().all(|&db| db == MIN_DECIBELS));
    }

    #[test]
    fn test_sine_peaks_in_its_bin() {
        let (mut tx, rx) = RingBuffer::<f32>::new(8192);
        let mut analyser = Analyser::new(rx, 1024, 0.0, SR);

        // 3 kHz sits exactly on bin 64 at 1024 points
        for i in 0..2048 {
            let t = i as f32 / SR as f32;
            tx.push((std::f32::consts::TAU * 3_000.0 * t).sin()).unwrap();
        }
        analyser.refresh();
        let frame = analyser.frame();
        assert_eq!(frame.peak_bin(), Some(64));
        assert!((frame.bin_frequency(64) - 3_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_time_domain_is_oldest_first() {
        let (mut tx, rx) = RingBuffer::<f32>::new(256);
        let mut analyser = Analyser::new(rx, 32, DEFAULT_SMOOTHING, SR);
        for i in 0..40 {
            tx.push(i as f32).unwrap();
        }
        analyser.refresh();
        let time = &analyser.frame().time_domain;
        assert_eq!(time[0], 8.0);
        assert_eq!(time[31], 39.0);
    }

    #[test]
    fn test_smoothing_blends_frames() {
        let (mut tx, rx) = RingBuffer::<f32>::new(8192);
        let mut analyser = Analyser::new(rx, 256, 0.8, SR);
        for _ in 0..256 {
            tx.push(0.5).unwrap();
        }
        analyser.refresh();
        let first = analyser.frame().frequency_db[0];
        for _ in 0..256 {
            tx.push(0.5).unwrap();
        }
        analyser.refresh();
        let second = analyser.frame().frequency_db[0];
        assert!(second > first);
    }
}
