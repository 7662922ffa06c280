// Transport - Playback state and sample-position bookkeeping
// Converts the audio driver's sample counter into logical clock seconds

use serde::Serialize;

/// Scheduler playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TransportState {
    #[default]
    Stopped,
    Running,
}

impl TransportState {
    /// Check if playing
    pub fn is_running(&self) -> bool {
        matches!(self, TransportState::Running)
    }
}

/// Window of transport time covered by one audio buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferWindow {
    /// First sample of the buffer
    pub start_samples: u64,
    pub frames: usize,
    /// Buffer start in seconds
    pub start: f64,
    /// Buffer end (exclusive) in seconds
    pub end: f64,
}

impl BufferWindow {
    /// Sample offset within the buffer for a time inside the window
    ///
    /// Times before the window (late events) land on offset 0.
    pub fn offset_of(&self, time: f64, sample_rate: f64) -> usize {
        let absolute = (time * sample_rate).round().max(0.0) as u64;
        let offset = absolute.saturating_sub(self.start_samples) as usize;
        offset.min(self.frames.saturating_sub(1))
    }
}

/// Sample-accurate position of the audio driver
///
/// Sample counts are integers so long sessions don't drift; seconds are
/// derived from them on demand.
#[derive(Debug, Clone)]
pub struct SampleTransport {
    position_samples: u64,
    sample_rate: f64,
}

impl SampleTransport {
    /// Transport at sample zero
    pub fn new(sample_rate: f64) -> Self {
        assert!(sample_rate > 0.0, "Sample rate must be > 0");
        Self {
            position_samples: 0,
            sample_rate,
        }
    }

    /// Sample rate (Hz)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Samples consumed so far
    pub fn position_samples(&self) -> u64 {
        self.position_samples
    }

    /// Convert a sample count to seconds
    pub fn samples_to_seconds(&self, samples: u64) -> f64 {
        samples as f64 / self.sample_rate
    }

    /// Consume `frames` samples, returning the window they cover
    pub fn advance(&mut self, frames: usize) -> BufferWindow {
        let start_samples = self.position_samples;
        self.position_samples += frames as u64;

        BufferWindow {
            start_samples,
            frames,
            start: self.samples_to_seconds(start_samples),
            end: self.samples_to_seconds(self.position_samples),
        }
    }
}
