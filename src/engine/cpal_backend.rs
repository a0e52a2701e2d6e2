//! Default input and output device through cpal.
//!
//! The input callback downmixes to mono and pushes into a ring; the output
//! callback pulls from it while rendering. The ring starts with
//! `input_latency` seconds of silence so small scheduling differences between
//! the two streams do not starve the output. Stream errors are only counted
//! here; the housekeeping tick reports them.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleRate, Stream, StreamConfig};
use rtrb::{Producer, RingBuffer};
use tracing::{info, warn};

use super::backend::AudioBackend;
use super::realtime::RealtimeProcessor;
use crate::config::EngineConfig;
use crate::EngineError;

struct Devices {
    input: Device,
    output: Device,
    input_config: StreamConfig,
    output_config: StreamConfig,
}

pub struct CpalBackend {
    host: cpal::Host,
    devices: Option<Devices>,
    streams: Vec<Stream>,
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            devices: None,
            streams: Vec::new(),
        }
    }
}

/// Queue `frames` of silence so the output side starts that far behind the input.
fn prefill(tx: &mut Producer<f32>, frames: usize) -> usize {
    match tx.write_chunk_uninit(frames.min(tx.slots())) {
        Ok(chunk) => chunk.fill_from_iter(std::iter::repeat(0.0)),
        Err(_) => 0,
    }
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> EngineError {
    EngineError::DeviceUnavailable(format!("{context}: {err}"))
}

impl AudioBackend for CpalBackend {
    fn acquire(&mut self, _config: &EngineConfig) -> Result<u32, EngineError> {
        let output = self
            .host
            .default_output_device()
            .ok_or_else(|| EngineError::DeviceUnavailable("no default output device".into()))?;
        let input = self
            .host
            .default_input_device()
            .ok_or_else(|| EngineError::DeviceUnavailable("no default input device".into()))?;

        let out_default = output
            .default_output_config()
            .map_err(|e| unavailable("output config", e))?;
        let in_default = input
            .default_input_config()
            .map_err(|e| unavailable("input config", e))?;

        // Both streams run at the output rate
        let sample_rate = out_default.sample_rate().0;
        let output_config = StreamConfig {
            channels: out_default.channels(),
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Default,
        };
        let input_config = StreamConfig {
            channels: in_default.channels(),
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Default,
        };

        info!(
            output = %output.name().unwrap_or_default(),
            input = %input.name().unwrap_or_default(),
            sample_rate,
            "audio devices acquired"
        );
        self.devices = Some(Devices {
            input,
            output,
            input_config,
            output_config,
        });
        Ok(sample_rate)
    }

    fn launch(&mut self, mut processor: RealtimeProcessor, config: &EngineConfig) -> Result<(), EngineError> {
        let devices = self.devices.as_ref().ok_or(EngineError::NotStarted)?;
        let sample_rate = processor.sample_rate();
        let in_channels = devices.input_config.channels.max(1) as usize;
        let out_channels = devices.output_config.channels.max(1) as usize;

        let latency = (config.input_latency.max(0.0) * sample_rate as f64) as usize;
        let (mut in_tx, mut in_rx) = RingBuffer::<f32>::new(latency + sample_rate as usize / 2);
        prefill(&mut in_tx, latency);

        let in_stats = std::sync::Arc::clone(processor.stats());
        let input_stream = devices
            .input
            .build_input_stream(
                &devices.input_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    for frame in data.chunks(in_channels) {
                        let mono = frame.iter().sum::<f32>() / frame.len() as f32;
                        // Output has stalled; newer input is lost until it catches up
                        if in_tx.push(mono).is_err() {
                            break;
                        }
                    }
                },
                move |_err| in_stats.add_stream_errors(1),
                None,
            )
            .map_err(|e| unavailable("input stream", e))?;

        let out_stats = std::sync::Arc::clone(processor.stats());
        let output_stream = devices
            .output
            .build_output_stream(
                &devices.output_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    processor.render(data, out_channels, |buf| {
                        let n = in_rx.slots().min(buf.len());
                        let Ok(chunk) = in_rx.read_chunk(n) else {
                            return 0;
                        };
                        let (first, second) = chunk.as_slices();
                        buf[..first.len()].copy_from_slice(first);
                        buf[first.len()..n].copy_from_slice(second);
                        chunk.commit_all();
                        n
                    });
                },
                move |_err| out_stats.add_stream_errors(1),
                None,
            )
            .map_err(|e| unavailable("output stream", e))?;

        input_stream
            .play()
            .map_err(|e| unavailable("start input", e))?;
        output_stream
            .play()
            .map_err(|e| unavailable("start output", e))?;

        self.streams = vec![input_stream, output_stream];
        info!(in_channels, out_channels, "audio streams running");
        Ok(())
    }

    fn halt(&mut self) {
        for stream in self.streams.drain(..) {
            if let Err(err) = stream.pause() {
                warn!(%err, "could not pause stream");
            }
        }
        self.devices = None;
    }
}
