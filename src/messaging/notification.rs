// Step notifications - Communication scheduler -> UI
// Each event carries the logical time it was scheduled for

use crate::pattern::{Foot, Note, Sprite};
use crate::sequencer::{ParameterError, TransportState};
use serde::Serialize;

/// What the scheduler owner reports to the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StepEvent {
    FootTone { foot: Foot, note: Note, time: f64 },
    SpriteChange { sprite: Sprite, time: f64 },
    /// Playback started, restarted or stopped
    Transport { state: TransportState, time: f64 },
    /// A command was refused; the current pattern keeps playing
    CommandRejected { error: ParameterError, time: f64 },
}

impl StepEvent {
    /// Scheduled transport time in seconds
    pub fn time(&self) -> f64 {
        match *self {
            StepEvent::FootTone { time, .. }
            | StepEvent::SpriteChange { time, .. }
            | StepEvent::Transport { time, .. }
            | StepEvent::CommandRejected { time, .. } => time,
        }
    }

    /// Foot of a tone event
    pub fn foot(&self) -> Option<Foot> {
        match *self {
            StepEvent::FootTone { foot, .. } => Some(foot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_event_accessors() {
        let tone = StepEvent::FootTone {
            foot: Foot::Right,
            note: Note::new(64),
            time: 1.5,
        };
        let sprite = StepEvent::SpriteChange {
            sprite: Sprite::LeftTransition,
            time: 1.9,
        };

        assert_eq!(tone.time(), 1.5);
        assert_eq!(tone.foot(), Some(Foot::Right));
        assert_eq!(sprite.time(), 1.9);
        assert_eq!(sprite.foot(), None);

        let rejected = StepEvent::CommandRejected {
            error: ParameterError::NonFinitePeriod(f64::INFINITY),
            time: 2.0,
        };
        assert_eq!(rejected.time(), 2.0);
        assert_eq!(rejected.foot(), None);
    }
}
