//! Offline export tests
//!
//! Renders sessions to WAV and reads them back to check where tones start.

use stepcue::{Command, ExportScript, ExportSettings, GaitKind, MetronomeConfig, StepExporter};

const SAMPLE_RATE: u32 = 8000;

fn read_samples(path: &std::path::Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

/// Frames where a tone starts after at least `gap` silent frames
fn onsets(samples: &[i16], gap: usize) -> Vec<usize> {
    let mut onsets = Vec::new();
    let mut silent = gap;

    for (index, sample) in samples.iter().enumerate() {
        if *sample == 0 {
            silent += 1;
        } else {
            if silent >= gap {
                onsets.push(index);
            }
            silent = 0;
        }
    }

    onsets
}

#[test]
fn test_walk_export_places_tones_on_half_periods() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("walk.wav");

    let settings = ExportSettings {
        sample_rate: SAMPLE_RATE,
        channels: 1,
    };
    let script = ExportScript::new().at(0.0, Command::Play);
    let summary = StepExporter::new(settings)
        .export(&path, &MetronomeConfig::default(), &script, 2.0)
        .unwrap();

    assert_eq!(summary.frames, 16000);
    assert!(summary.peak > 0.1);

    let (spec, samples) = read_samples(&path);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(samples.len(), 16000);

    // Sine starts at phase zero, so each onset lands one frame after the step
    let starts: Vec<usize> = onsets(&samples, 200)
        .into_iter()
        .map(|i| i.saturating_sub(1))
        .collect();
    assert_eq!(starts, vec![0, 4000, 8000, 12000]);
}

#[test]
fn test_scripted_switch_changes_rhythm() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallop.wav");

    let settings = ExportSettings {
        sample_rate: SAMPLE_RATE,
        channels: 1,
    };
    let script = ExportScript::new().at(0.0, Command::Play).at(
        0.25,
        Command::SetParameters {
            kind: GaitKind::Gallop,
            period: 1.0,
            asymmetry: 0.6,
        },
    );
    StepExporter::new(settings)
        .export(&path, &MetronomeConfig::default(), &script, 2.0)
        .unwrap();

    let (_, samples) = read_samples(&path);
    let starts: Vec<usize> = onsets(&samples, 200)
        .into_iter()
        .map(|i| i.saturating_sub(1))
        .collect();

    // Walk for the first cycle, then gallop with its right step at 0.7
    assert_eq!(starts, vec![0, 4000, 8000, 13600]);
}

#[test]
fn test_stereo_export_duplicates_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");

    let script = ExportScript::new().at(0.0, Command::Play);
    StepExporter::new(ExportSettings {
        sample_rate: SAMPLE_RATE,
        channels: 2,
    })
    .export(&path, &MetronomeConfig::default(), &script, 0.5)
    .unwrap();

    let (spec, samples) = read_samples(&path);
    assert_eq!(spec.channels, 2);
    assert_eq!(samples.len(), 8000);
    assert!(samples.chunks(2).all(|frame| frame[0] == frame[1]));
    assert!(samples.iter().any(|s| *s != 0));
}
