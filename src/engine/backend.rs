use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::realtime::RealtimeProcessor;
use crate::config::EngineConfig;
use crate::EngineError;

/// Something that can run a [`RealtimeProcessor`] against audio I/O.
pub trait AudioBackend {
    /// Claim input and output. Returns the sample rate the engine must run
    /// at.
    fn acquire(&mut self, config: &EngineConfig) -> Result<u32, EngineError>;

    /// Take the processor and start calling it.
    fn launch(&mut self, processor: RealtimeProcessor, config: &EngineConfig) -> Result<(), EngineError>;

    /// Stop calling the processor and release the devices.
    fn halt(&mut self);
}

type Slot = Arc<Mutex<Option<RealtimeProcessor>>>;

/// Backend with no hardware: the caller drives rendering through a
/// [`ManualDriver`].
///
/// ```
/// use neuroamp_dsp::engine::ManualBackend;
/// use neuroamp_dsp::{Engine, EngineConfig};
///
/// let backend = ManualBackend::new(48_000);
/// let driver = backend.driver();
/// let mut engine = Engine::new(EngineConfig::default(), backend);
/// engine.start().unwrap();
///
/// let input = vec![0.0; 256];
/// let mut output = vec![0.0; 512];
/// assert_eq!(driver.render(&input, &mut output, 2), 256);
/// ```
pub struct ManualBackend {
    sample_rate: u32,
    available: bool,
    slot: Slot,
}

impl ManualBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            available: true,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// A backend whose devices can never be acquired.
    pub fn unavailable(sample_rate: u32) -> Self {
        Self {
            available: false,
            ..Self::new(sample_rate)
        }
    }

    pub fn driver(&self) -> ManualDriver {
        ManualDriver {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl AudioBackend for ManualBackend {
    fn acquire(&mut self, _config: &EngineConfig) -> Result<u32, EngineError> {
        if !self.available {
            return Err(EngineError::DeviceUnavailable(
                "manual backend has no device".into(),
            ));
        }
        Ok(self.sample_rate)
    }

    fn launch(&mut self, processor: RealtimeProcessor, _config: &EngineConfig) -> Result<(), EngineError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(processor);
        debug!(sample_rate = self.sample_rate, "manual backend launched");
        Ok(())
    }

    fn halt(&mut self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Caller-side handle to a [`ManualBackend`].
#[derive(Clone)]
pub struct ManualDriver {
    slot: Slot,
}

impl ManualDriver {
    pub fn is_running(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Render `output.len() / channels` frames from mono `input`. Input
    /// shorter than the block is padded with silence and counted as an
    /// underrun. Returns the frames rendered, 0 while stopped.
    pub fn render(&self, input: &[f32], output: &mut [f32], channels: usize) -> usize {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(processor) = slot.as_mut() else {
            output.fill(0.0);
            return 0;
        };
        let mut offset = 0;
        processor.render(output, channels, |buf| {
            let n = buf.len().min(input.len().saturating_sub(offset));
            buf[..n].copy_from_slice(&input[offset..offset + n]);
            offset += n;
            n
        });
        output.len() / channels.max(1)
    }
}
