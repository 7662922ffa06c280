// Pattern module - Gait generators and the step sequences they produce

pub mod gait;
pub mod sequence;

pub use gait::{GaitKind, PatternLimits, UnknownGait, gallop, skip, walk};
pub use sequence::{Action, Foot, Note, Sprite, StepSequence};
