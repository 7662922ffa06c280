// Step controller - Entry point for the UI: parameters, play, stop
// Turns parameter changes into fresh sequences for the scheduler
//
// Runs on the audio thread when driven by the renderer: no logging here,
// callers report outcomes from their own thread.

use super::clock::LogicalClock;
use super::scheduler::{ScheduledEvent, StepListener, StepScheduler};
use crate::config::{ConfigError, MetronomeConfig};
use crate::messaging::command::Command;
use crate::pattern::{GaitKind, PatternLimits, StepSequence};
use serde::Serialize;

/// Parameters rejected before they reach the generators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, thiserror::Error)]
pub enum ParameterError {
    #[error("Period must be a finite number of seconds, got {0}")]
    NonFinitePeriod(f64),

    #[error("Asymmetry must be a finite number, got {0}")]
    NonFiniteAsymmetry(f64),
}

/// Current pattern selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParameters {
    pub kind: GaitKind,
    pub period: f64,
    pub asymmetry: f64,
}

/// Owns the scheduler and the parameters it is playing
pub struct StepController<C: LogicalClock<ScheduledEvent>> {
    scheduler: StepScheduler<C>,
    limits: PatternLimits,
    parameters: StepParameters,
}

impl<C: LogicalClock<ScheduledEvent>> StepController<C> {
    /// Create a controller for `config`, stopped
    ///
    /// The config is validated here so that note numbers and bounds can't
    /// panic later inside the generators.
    pub fn new(scheduler: StepScheduler<C>, config: &MetronomeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            scheduler,
            limits: config.limits,
            parameters: StepParameters {
                kind: config.gait,
                period: config.limits.clamp_period(config.period),
                asymmetry: config.limits.clamp_asymmetry(config.asymmetry),
            },
        })
    }

    /// Get the scheduler (read-only)
    pub fn scheduler(&self) -> &StepScheduler<C> {
        &self.scheduler
    }

    /// Parameters of the pattern last selected, after clamping
    pub fn parameters(&self) -> StepParameters {
        self.parameters
    }

    /// Get generator bounds
    pub fn limits(&self) -> &PatternLimits {
        &self.limits
    }

    /// Sequence for the current parameters
    pub fn build_sequence(&self) -> StepSequence {
        let StepParameters {
            kind,
            period,
            asymmetry,
        } = self.parameters;
        kind.build(period, asymmetry, &self.limits)
    }

    /// Select a new pattern
    ///
    /// Out-of-range values are clamped; non-finite ones are rejected. The
    /// new sequence replaces the running one at the next cycle boundary, or
    /// starts playback if stopped. Returns the parameters actually applied.
    pub fn set_parameters(
        &mut self,
        kind: GaitKind,
        period: f64,
        asymmetry: f64,
    ) -> Result<StepParameters, ParameterError> {
        if !period.is_finite() {
            return Err(ParameterError::NonFinitePeriod(period));
        }
        if !asymmetry.is_finite() {
            return Err(ParameterError::NonFiniteAsymmetry(asymmetry));
        }

        self.parameters = StepParameters {
            kind,
            period: self.limits.clamp_period(period),
            asymmetry: self.limits.clamp_asymmetry(asymmetry),
        };
        let sequence = self.build_sequence();
        self.scheduler.apply_sequence(sequence);
        Ok(self.parameters)
    }

    /// Start (or restart) playback with the current parameters
    pub fn play(&mut self) {
        let sequence = self.build_sequence();
        self.scheduler.start(sequence);
    }

    /// Stop playback, cancelling everything still scheduled
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Apply one inbound message
    pub fn handle_command(&mut self, command: Command) -> Result<(), ParameterError> {
        match command {
            Command::SetParameters {
                kind,
                period,
                asymmetry,
            } => self.set_parameters(kind, period, asymmetry).map(|_| ()),
            Command::Play => {
                self.play();
                Ok(())
            }
            Command::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    /// Advance transport time, delivering step callbacks to `listener`
    pub fn advance_to(&mut self, time: f64, listener: &mut impl StepListener) {
        self.scheduler.advance_to(time, listener);
    }
}
