// StepCue - Library exports for the runner, tests and benchmarks

pub mod audio;
pub mod config;
pub mod messaging;
pub mod pattern;
pub mod sequencer;

// Re-export commonly used types for convenience
pub use audio::engine::{AudioEngine, EngineError};
pub use audio::export::{ExportError, ExportScript, ExportSettings, StepExporter};
pub use audio::render::StepRenderer;
pub use config::{ConfigError, MetronomeConfig, ToneSettings};
pub use messaging::channels::{create_command_channel, create_step_event_channel};
pub use messaging::command::Command;
pub use messaging::notification::StepEvent;
pub use pattern::{Action, Foot, GaitKind, Note, PatternLimits, Sprite, StepSequence};
pub use sequencer::{
    EventClock, LogicalClock, ParameterError, StepController, StepListener, StepScheduler,
    TransportState,
};
