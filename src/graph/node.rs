use crate::MAX_BLOCK_SIZE;

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frame: Index of the first frame in the block on the engine's audio clock
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frame: u64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, frame: u64) -> Self {
        Self { sample_rate, frame }
    }

    /// Audio-clock time of the block start, in seconds.
    pub fn time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

/// Mono processing stage.
///
/// Everything up to the fan-out runs on a single channel, and the parallel
/// delay and chorus paths stay mono too.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Clear internal state (delay memory, filter integrators).
    fn reset(&mut self) {}
}

/// Stage that works on the stereo half of the bus (reverb onward).
pub trait StereoNode: Send {
    fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx);

    fn reset(&mut self) {}
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Per-stage scratch block, allocated once at graph construction.
#[derive(Default)]
pub struct StereoBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_BLOCK_SIZE)
    }

    pub fn with_capacity(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn clear(&mut self, frames: usize) {
        self.left[..frames].fill(0.0);
        self.right[..frames].fill(0.0);
    }

    /// Add the first `frames` frames of `other` into this buffer.
    pub fn accumulate(&mut self, other: &StereoBuffer, frames: usize) {
        crate::dsp::mix::sum_into(&mut self.left[..frames], &other.left[..frames], 1.0);
        crate::dsp::mix::sum_into(&mut self.right[..frames], &other.right[..frames], 1.0);
    }

    /// Copy the left channel over the right one after mono processing.
    pub fn mirror_left(&mut self, frames: usize) {
        let (left, right) = (&self.left[..frames], &mut self.right[..frames]);
        right.copy_from_slice(left);
    }

    pub fn split(&mut self, frames: usize) -> (&mut [f32], &mut [f32]) {
        (&mut self.left[..frames], &mut self.right[..frames])
    }
}
