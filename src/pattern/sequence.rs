// Step sequence - One cycle of timed tone and sprite actions
// Immutable value produced by the gait generators and consumed by the scheduler

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which foot a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Foot {
    Left,
    Right,
}

impl fmt::Display for Foot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Foot::Left => f.pad("left"),
            Foot::Right => f.pad("right"),
        }
    }
}

/// Sprite shown by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    LeftStep,
    RightStep,
    LeftTransition,
    RightTransition,
}

impl Sprite {
    /// Sprite for a foot landing
    pub fn step(foot: Foot) -> Self {
        match foot {
            Foot::Left => Sprite::LeftStep,
            Foot::Right => Sprite::RightStep,
        }
    }

    /// Sprite announcing that `foot` lands next
    pub fn transition(foot: Foot) -> Self {
        match foot {
            Foot::Left => Sprite::LeftTransition,
            Foot::Right => Sprite::RightTransition,
        }
    }
}

/// Tone pitch as a MIDI note number (60 = C4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note(u8);

impl Note {
    /// Panics if `midi` is above 127; configs are validated before notes are built
    pub fn new(midi: u8) -> Self {
        assert!(midi <= 127, "MIDI note must be 0-127");
        Self(midi)
    }

    /// MIDI note number
    pub fn midi(self) -> u8 {
        self.0
    }

    /// Equal-tempered frequency, A4 (69) = 440 Hz
    pub fn frequency_hz(self) -> f32 {
        440.0 * 2f32.powf((self.0 as f32 - 69.0) / 12.0)
    }
}

/// A single timed action within a cycle
///
/// Offsets are in seconds from the start of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Action {
    Tone { offset: f64, foot: Foot, note: Note },
    SpriteChange { offset: f64, sprite: Sprite },
}

impl Action {
    /// Seconds from the start of the cycle
    pub fn offset(&self) -> f64 {
        match *self {
            Action::Tone { offset, .. } | Action::SpriteChange { offset, .. } => offset,
        }
    }
}

/// One cycle of a stepping pattern
///
/// Invariants (checked on construction, a violation panics):
/// - `duration` is finite and > 0
/// - every offset lies in `[0, duration)`
/// - offsets are sorted non-decreasing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSequence {
    duration: f64,
    actions: Vec<Action>,
}

impl StepSequence {
    /// Creates a sequence, panicking on malformed input
    ///
    /// A malformed sequence can only come from a generator bug and would
    /// corrupt cycle timing, so it is not a recoverable error.
    pub fn new(duration: f64, actions: Vec<Action>) -> Self {
        assert!(
            duration.is_finite() && duration > 0.0,
            "Sequence duration must be finite and > 0"
        );

        let mut previous = 0.0;
        for action in &actions {
            let offset = action.offset();
            assert!(
                offset.is_finite() && offset >= 0.0 && offset < duration,
                "Action offset must lie in [0, duration)"
            );
            assert!(offset >= previous, "Action offsets must be non-decreasing");
            previous = offset;
        }

        Self { duration, actions }
    }

    /// Cycle length in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// All actions, sorted by offset
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Tone actions only, in offset order
    pub fn tones(&self) -> impl Iterator<Item = (f64, Foot, Note)> + '_ {
        self.actions.iter().filter_map(|action| match *action {
            Action::Tone { offset, foot, note } => Some((offset, foot, note)),
            Action::SpriteChange { .. } => None,
        })
    }
}
