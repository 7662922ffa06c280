// Step tones - Short enveloped sine tones triggered on each footstep
// Pre-generates one buffer per note for low CPU overhead in the callback

use crate::config::ToneSettings;
use crate::pattern::{Note, PatternLimits};
use std::f32::consts::PI;

/// Pre-rendered tone buffers, one per foot note
#[derive(Debug, Clone)]
pub struct ToneBank {
    tones: Vec<(Note, Vec<f32>)>,
}

impl ToneBank {
    /// Render the tones for every note the generators can emit
    pub fn new(sample_rate: f32, limits: &PatternLimits, settings: &ToneSettings) -> Self {
        let num_samples = (settings.duration_ms * sample_rate / 1000.0).round().max(1.0) as usize;

        let mut tones = Vec::with_capacity(2);
        for midi in [limits.left_note, limits.right_note] {
            let note = Note::new(midi);
            if tones.iter().all(|(existing, _)| *existing != note) {
                tones.push((
                    note,
                    Self::generate_tone(sample_rate, num_samples, note.frequency_hz(), settings.amplitude),
                ));
            }
        }

        Self { tones }
    }

    /// Sine wave with a fast exponential decay
    fn generate_tone(sample_rate: f32, num_samples: usize, frequency: f32, amplitude: f32) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / sample_rate;

        (0..num_samples)
            .map(|i| {
                let t = i as f32 / num_samples as f32;
                let envelope = (-t * 6.0).exp();
                (i as f32 * phase_increment).sin() * envelope * amplitude
            })
            .collect()
    }

    /// Index of the buffer for `note`, if it was rendered
    pub fn index_of(&self, note: Note) -> Option<usize> {
        self.tones.iter().position(|(existing, _)| *existing == note)
    }

    /// Rendered samples of the buffer at `index`
    pub fn samples(&self, index: usize) -> &[f32] {
        &self.tones[index].1
    }

    /// Tone length in samples
    pub fn tone_length(&self) -> usize {
        self.tones.first().map_or(0, |(_, samples)| samples.len())
    }
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    tone: usize,
    /// Samples left to wait before the tone starts
    delay: usize,
    position: usize,
}

/// Plays tones from a [`ToneBank`] with sample-accurate start offsets
///
/// Fixed voice pool: when full, the oldest voice is replaced.
#[derive(Debug, Clone)]
pub struct TonePlayer {
    bank: ToneBank,
    voices: Vec<Voice>,
    max_voices: usize,
    volume: f32,
}

impl TonePlayer {
    const MAX_VOICES: usize = 8;

    /// Silent player; `volume` is clamped to [0, 1]
    pub fn new(bank: ToneBank, volume: f32) -> Self {
        Self {
            bank,
            voices: Vec::with_capacity(Self::MAX_VOICES),
            max_voices: Self::MAX_VOICES,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Voices playing or waiting for their offset
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Start `note` after `delay` samples. Unknown notes are ignored.
    pub fn trigger(&mut self, note: Note, delay: usize) {
        let Some(tone) = self.bank.index_of(note) else {
            return;
        };

        if self.voices.len() == self.max_voices {
            self.voices.remove(0);
        }
        self.voices.push(Voice {
            tone,
            delay,
            position: 0,
        });
    }

    /// Produce the next mono sample
    pub fn next_sample(&mut self) -> f32 {
        let mut sum = 0.0f32;

        for voice in self.voices.iter_mut() {
            if voice.delay > 0 {
                voice.delay -= 1;
                continue;
            }
            let samples = self.bank.samples(voice.tone);
            if let Some(&sample) = samples.get(voice.position) {
                sum += sample;
            }
            voice.position += 1;
        }

        let bank = &self.bank;
        self.voices
            .retain(|voice| voice.position < bank.samples(voice.tone).len());

        sum * self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> ToneBank {
        ToneBank::new(48000.0, &PatternLimits::default(), &ToneSettings::default())
    }

    #[test]
    fn test_bank_has_one_tone_per_note() {
        let bank = bank();
        let limits = PatternLimits::default();

        assert!(bank.index_of(Note::new(limits.left_note)).is_some());
        assert!(bank.index_of(Note::new(limits.right_note)).is_some());
        assert!(bank.index_of(Note::new(100)).is_none());

        // 60ms at 48kHz
        assert_eq!(bank.tone_length(), 2880);
    }

    #[test]
    fn test_shared_note_rendered_once() {
        let limits = PatternLimits {
            left_note: 62,
            right_note: 62,
            ..Default::default()
        };
        let bank = ToneBank::new(48000.0, &limits, &ToneSettings::default());
        assert_eq!(bank.index_of(Note::new(62)), Some(0));
        assert_eq!(bank.tones.len(), 1);
    }

    #[test]
    fn test_trigger_respects_delay() {
        let mut player = TonePlayer::new(bank(), 1.0);
        player.trigger(Note::new(60), 100);

        for _ in 0..100 {
            assert_eq!(player.next_sample(), 0.0);
        }

        let audible = (0..200).filter(|_| player.next_sample().abs() > 1e-4).count();
        assert!(audible > 150);
    }

    #[test]
    fn test_voice_ends_after_tone() {
        let mut player = TonePlayer::new(bank(), 1.0);
        player.trigger(Note::new(64), 0);
        assert_eq!(player.active_voices(), 1);

        for _ in 0..2880 {
            player.next_sample();
        }
        assert_eq!(player.active_voices(), 0);
        assert_eq!(player.next_sample(), 0.0);
    }

    #[test]
    fn test_volume_scales_output() {
        let mut loud = TonePlayer::new(bank(), 1.0);
        let mut quiet = TonePlayer::new(bank(), 0.5);
        loud.trigger(Note::new(60), 0);
        quiet.trigger(Note::new(60), 0);

        let peak_loud = (0..500).map(|_| loud.next_sample().abs()).fold(0.0f32, f32::max);
        let peak_quiet = (0..500).map(|_| quiet.next_sample().abs()).fold(0.0f32, f32::max);

        assert!((peak_loud - 2.0 * peak_quiet).abs() < 1e-4);
    }

    #[test]
    fn test_voice_pool_is_bounded() {
        let mut player = TonePlayer::new(bank(), 1.0);
        for _ in 0..20 {
            player.trigger(Note::new(60), 10);
        }
        assert_eq!(player.active_voices(), TonePlayer::MAX_VOICES);
    }
}
