// Gait generators - Walk, gallop and skip step patterns
// Pure functions mapping (period, asymmetry) to a StepSequence

use super::sequence::{Action, Foot, Note, Sprite, StepSequence};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stepping pattern kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaitKind {
    /// Even left/right steps (also used for jogging)
    Walk,
    /// Long/short alternating steps, leading-leg bias
    Gallop,
    /// Two long and two short intervals per cycle with a double step on each foot
    Skip,
}

impl GaitKind {
    pub const ALL: [GaitKind; 3] = [GaitKind::Walk, GaitKind::Gallop, GaitKind::Skip];

    /// Build the sequence for this gait
    ///
    /// `asymmetry` is ignored by `Walk`.
    pub fn build(self, period: f64, asymmetry: f64, limits: &PatternLimits) -> StepSequence {
        match self {
            GaitKind::Walk => walk(period, limits),
            GaitKind::Gallop => gallop(period, asymmetry, limits),
            GaitKind::Skip => skip(period, asymmetry, limits),
        }
    }
}

impl fmt::Display for GaitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GaitKind::Walk => write!(f, "walk"),
            GaitKind::Gallop => write!(f, "gallop"),
            GaitKind::Skip => write!(f, "skip"),
        }
    }
}

/// Gait name that does not parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown gait: {0} (expected walk, gallop or skip)")]
pub struct UnknownGait(pub String);

impl FromStr for GaitKind {
    type Err = UnknownGait;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" | "jog" => Ok(GaitKind::Walk),
            "gallop" => Ok(GaitKind::Gallop),
            "skip" => Ok(GaitKind::Skip),
            other => Err(UnknownGait(other.to_string())),
        }
    }
}

/// Bounds and constants shared by all generators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternLimits {
    /// Shortest allowed period (seconds)
    pub period_min: f64,
    /// Longest allowed period (seconds)
    pub period_max: f64,
    /// Asymmetry is clamped into (epsilon, 1 - epsilon)
    pub asymmetry_epsilon: f64,
    /// Upper bound on the transition sub-interval (seconds)
    pub transition_cap: f64,
    /// MIDI note of left steps
    pub left_note: u8,
    /// MIDI note of right steps
    pub right_note: u8,
}

impl PatternLimits {
    /// Clamp into `[period_min, period_max]`
    pub fn clamp_period(&self, period: f64) -> f64 {
        period.clamp(self.period_min, self.period_max)
    }

    /// Clamp into `[epsilon, 1 - epsilon]`
    pub fn clamp_asymmetry(&self, asymmetry: f64) -> f64 {
        asymmetry.clamp(self.asymmetry_epsilon, 1.0 - self.asymmetry_epsilon)
    }

    /// Length of the lead-in at the start of an interval, before its transition sprite
    pub fn transition_for(&self, interval: f64) -> f64 {
        self.transition_cap.min(interval / 3.0)
    }

    /// Tone pitch for `foot`
    pub fn note_for(&self, foot: Foot) -> Note {
        match foot {
            Foot::Left => Note::new(self.left_note),
            Foot::Right => Note::new(self.right_note),
        }
    }
}

impl Default for PatternLimits {
    fn default() -> Self {
        Self {
            period_min: 0.25,
            period_max: 2.0,
            asymmetry_epsilon: 0.001,
            transition_cap: 0.15,
            left_note: 60,
            right_note: 64,
        }
    }
}

/// One foot-to-foot interval: the foot stepping at its start and its length
#[derive(Debug, Clone, Copy)]
struct Interval {
    from: Foot,
    to: Foot,
    length: f64,
}

impl Interval {
    fn new(from: Foot, to: Foot, length: f64) -> Self {
        Self { from, to, length }
    }
}

/// Long and short intervals for the asymmetric gaits
///
/// Long = P * (1 - a/2), short = P * a/2. Both approach P/2 as a -> 1.
fn split(period: f64, asymmetry: f64) -> (f64, f64) {
    let short = period * asymmetry / 2.0;
    (period - short, short)
}

/// Lay the intervals end to end: a tone at each start, and the transition
/// sprite for the next foot once the interval's lead-in has elapsed.
fn assemble(intervals: &[Interval], limits: &PatternLimits) -> StepSequence {
    let mut actions = Vec::with_capacity(intervals.len() * 2);
    let mut start = 0.0;

    for interval in intervals {
        debug_assert!(interval.length > 0.0 && interval.length.is_finite());

        actions.push(Action::Tone {
            offset: start,
            foot: interval.from,
            note: limits.note_for(interval.from),
        });

        let transition = limits.transition_for(interval.length);
        actions.push(Action::SpriteChange {
            offset: start + transition,
            sprite: Sprite::transition(interval.to),
        });

        start += interval.length;
    }

    StepSequence::new(start, actions)
}

/// Walk/jog: two equal half-period steps
pub fn walk(period: f64, limits: &PatternLimits) -> StepSequence {
    let period = limits.clamp_period(period);
    let half = period / 2.0;

    assemble(
        &[
            Interval::new(Foot::Left, Foot::Right, half),
            Interval::new(Foot::Right, Foot::Left, half),
        ],
        limits,
    )
}

/// Gallop: long left-to-right then short right-to-left within one period
pub fn gallop(period: f64, asymmetry: f64, limits: &PatternLimits) -> StepSequence {
    let period = limits.clamp_period(period);
    let (long, short) = split(period, limits.clamp_asymmetry(asymmetry));

    assemble(
        &[
            Interval::new(Foot::Left, Foot::Right, long),
            Interval::new(Foot::Right, Foot::Left, short),
        ],
        limits,
    )
}

/// Skip: L->R long, R->R short, R->L long, L->L short; the cycle spans two periods
pub fn skip(period: f64, asymmetry: f64, limits: &PatternLimits) -> StepSequence {
    let period = limits.clamp_period(period);
    let (long, short) = split(period, limits.clamp_asymmetry(asymmetry));

    assemble(
        &[
            Interval::new(Foot::Left, Foot::Right, long),
            Interval::new(Foot::Right, Foot::Right, short),
            Interval::new(Foot::Right, Foot::Left, long),
            Interval::new(Foot::Left, Foot::Left, short),
        ],
        limits,
    )
}
