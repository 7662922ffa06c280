// Audio engine - CPAL real-time output hosting the step renderer
//
// The renderer is moved into the data callback and owned by the audio
// thread; the UI only talks to it through the command and step-event
// ringbuffers. Supports F32, I16 and U16 devices: everything is rendered in
// f32 and converted when written to the device buffer.

use crate::audio::render::StepRenderer;
use crate::config::{ConfigError, MetronomeConfig};
use crate::messaging::channels::{CommandConsumer, StepEventProducer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// Audio engine error types
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Invalid metronome config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("Failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0:?}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(SampleFormat),
}

/// Owns the cpal stream; playback stops when this is dropped
pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    stream_failed: Arc<AtomicBool>,
}

impl AudioEngine {
    /// Open the default output device and start playing silence until a
    /// `Play` command arrives
    pub fn new(
        config: &MetronomeConfig,
        commands: CommandConsumer,
        events: StepEventProducer,
    ) -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(EngineError::NoDevice)?;

        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            "Audio device selected"
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        info!(?sample_format, sample_rate, channels, "Audio config");

        let stream_config: StreamConfig = supported_config.into();
        let renderer = StepRenderer::new(sample_rate, config)?
            .with_commands(commands)
            .with_events(events);
        let stream_failed = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &stream_config,
                channels,
                renderer,
                Arc::clone(&stream_failed),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &stream_config,
                channels,
                renderer,
                Arc::clone(&stream_failed),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &stream_config,
                channels,
                renderer,
                Arc::clone(&stream_failed),
            ),
            other => return Err(EngineError::UnsupportedFormat(other)),
        }?;

        stream.play()?;
        info!("Audio stream started");

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            stream_failed,
        })
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut renderer: StepRenderer,
        stream_failed: Arc<AtomicBool>,
    ) -> Result<Stream, EngineError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Real-time thread: no locks, no blocking
                renderer.render_interleaved(data, channels);
            },
            move |err| {
                // Runs outside the audio callback, so logging is fine here
                error!("Audio stream error: {}", err);
                stream_failed.store(true, Ordering::Relaxed);
            },
            None,
        )?;

        Ok(stream)
    }

    /// Device sample rate (Hz)
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// True once the device reported a stream error
    pub fn has_failed(&self) -> bool {
        self.stream_failed.load(Ordering::Relaxed)
    }
}
