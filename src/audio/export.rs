// Audio export - Offline rendering of a step session to WAV
//
// Runs the same renderer as the real-time engine, as fast as possible,
// applying scripted commands at their transport times.

use crate::audio::render::StepRenderer;
use crate::config::{ConfigError, MetronomeConfig};
use crate::messaging::command::Command;
use crate::sequencer::ParameterError;
use cpal::Sample;
use hound::{WavSpec, WavWriter};
use std::path::Path;
use tracing::info;

/// Export error types
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid duration: {0} (must be finite and > 0)")]
    InvalidDuration(f64),

    #[error("Invalid export settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid metronome config: {0}")]
    Config(#[from] ConfigError),

    #[error("Scripted command rejected: {0}")]
    Parameter(#[from] ParameterError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Audio export settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    /// Sample rate (Hz)
    pub sample_rate: u32,
    /// Number of channels (1=mono, 2=stereo)
    pub channels: u16,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
        }
    }
}

/// Commands to apply during an offline render, with their transport times
#[derive(Debug, Clone, Default)]
pub struct ExportScript {
    commands: Vec<(f64, Command)>,
}

impl ExportScript {
    /// Empty script: the render stays silent
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command` once transport time reaches `time`
    pub fn at(mut self, time: f64, command: Command) -> Self {
        let index = self.commands.partition_point(|(t, _)| *t <= time);
        self.commands.insert(index, (time, command));
        self
    }
}

/// What an export produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSummary {
    pub frames: u64,
    pub peak: f32,
}

/// Offline renderer writing 16-bit WAV files
pub struct StepExporter {
    settings: ExportSettings,
}

impl StepExporter {
    const BUFFER_SIZE: usize = 512;

    /// Exporter for the given output format
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    /// Render `duration_seconds` of the session described by `script` to `path`
    pub fn export(
        &self,
        path: &Path,
        config: &MetronomeConfig,
        script: &ExportScript,
        duration_seconds: f64,
    ) -> Result<ExportSummary, ExportError> {
        if !(duration_seconds.is_finite() && duration_seconds > 0.0) {
            return Err(ExportError::InvalidDuration(duration_seconds));
        }
        if self.settings.sample_rate == 0 || !(1..=2).contains(&self.settings.channels) {
            return Err(ExportError::InvalidSettings(format!(
                "{} Hz, {} channels",
                self.settings.sample_rate, self.settings.channels
            )));
        }

        let spec = WavSpec {
            channels: self.settings.channels,
            sample_rate: self.settings.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut renderer = StepRenderer::new(self.settings.sample_rate as f32, config)?;
        let mut writer = WavWriter::create(path, spec)?;

        let sample_rate = self.settings.sample_rate as f64;
        let total_frames = (duration_seconds * sample_rate).round() as u64;
        info!(
            path = %path.display(),
            seconds = duration_seconds,
            frames = total_frames,
            "Exporting steps"
        );

        let mut pending = script.commands.iter().peekable();
        let mut buffer = vec![0.0f32; Self::BUFFER_SIZE];
        let mut rendered: u64 = 0;
        let mut peak = 0.0f32;

        while rendered < total_frames {
            let frames = Self::BUFFER_SIZE.min((total_frames - rendered) as usize);
            let buffer_start = rendered as f64 / sample_rate;

            while let Some((_, command)) = pending.next_if(|(time, _)| *time <= buffer_start) {
                renderer.controller_mut().handle_command(*command)?;
            }

            let out = &mut buffer[..frames];
            renderer.render(out);

            for &sample in out.iter() {
                peak = peak.max(sample.abs());
                let value: i16 = Sample::from_sample::<f32>(sample);
                for _ in 0..self.settings.channels {
                    writer.write_sample(value)?;
                }
            }

            rendered += frames as u64;
        }

        writer.finalize()?;
        info!(frames = rendered, peak, "Export finished");

        Ok(ExportSummary {
            frames: rendered,
            peak,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::GaitKind;

    fn settings() -> ExportSettings {
        ExportSettings {
            sample_rate: 8000,
            channels: 1,
        }
    }

    #[test]
    fn test_invalid_duration() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = StepExporter::new(settings());

        let result = exporter.export(
            &dir.path().join("x.wav"),
            &MetronomeConfig::default(),
            &ExportScript::new(),
            0.0,
        );
        assert!(matches!(result, Err(ExportError::InvalidDuration(_))));
    }

    #[test]
    fn test_script_orders_commands() {
        let script = ExportScript::new()
            .at(2.0, Command::Stop)
            .at(0.0, Command::Play)
            .at(1.0, Command::Play);

        let times: Vec<f64> = script.commands.iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_silent_without_play() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.wav");

        let summary = StepExporter::new(settings())
            .export(&path, &MetronomeConfig::default(), &ExportScript::new(), 0.5)
            .unwrap();

        assert_eq!(summary.frames, 4000);
        assert_eq!(summary.peak, 0.0);
    }

    #[test]
    fn test_rejected_script_command() {
        let dir = tempfile::tempdir().unwrap();
        let script = ExportScript::new().at(
            0.0,
            Command::SetParameters {
                kind: GaitKind::Skip,
                period: f64::INFINITY,
                asymmetry: 0.5,
            },
        );

        let result = StepExporter::new(settings()).export(
            &dir.path().join("bad.wav"),
            &MetronomeConfig::default(),
            &script,
            1.0,
        );
        assert!(matches!(result, Err(ExportError::Parameter(_))));
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_config.wav");
        let mut config = MetronomeConfig::default();
        config.limits.left_note = 200;

        let result = StepExporter::new(settings()).export(&path, &config, &ExportScript::new(), 1.0);
        assert!(matches!(result, Err(ExportError::Config(_))));
        assert!(!path.exists());
    }
}
