/// Circular delay buffer with fractional reads.
///
/// Capacity is fixed at construction; the realtime thread never resizes it.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Delay line able to hold `max_delay_samples` of history.
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(2) + 1],
            write_pos: 0,
        }
    }

    /// Sized for `seconds` at `sample_rate`, with one block of headroom.
    pub fn with_seconds(seconds: f32, sample_rate: f32) -> Self {
        let samples = (seconds * sample_rate).ceil() as usize + crate::MAX_BLOCK_SIZE;
        Self::new(samples)
    }

    /// Longest delay that can be read back, in samples.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Sample written `delay_samples` writes ago (1 = the most recent write).
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Linearly interpolated read for modulated or fractional delays.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let delay = delay_samples.clamp(1.0, max);
        let whole = delay.floor();
        let frac = delay - whole;
        let a = self.read(whole as usize);
        let b = self.read(whole as usize + 1);
        a + (b - a) * frac
    }

    /// Classic fixed-delay step: write `sample`, return the one from `delay_samples` ago.
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        self.write(sample);
        self.read(delay_samples + 1)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
