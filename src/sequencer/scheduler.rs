// Step scheduler - Plays a StepSequence cycle after cycle on a logical clock
// Pattern swaps are committed only at cycle boundaries
//
// Runs inside the audio callback: no logging, no I/O. State changes are
// observable through the accessors and the listener.

use super::clock::{ClockHandle, EventClock, LogicalClock};
use super::transport::TransportState;
use crate::messaging::notification::StepEvent;
use crate::pattern::{Action, Foot, Note, Sprite, StepSequence};

/// Receives the scheduler's side effects
///
/// Both callbacks get the *scheduled* time of the action, never the time the
/// host got around to running it.
pub trait StepListener {
    /// A foot tone is due
    fn on_foot_tone(&mut self, foot: Foot, note: Note, scheduled_time: f64);
    /// The UI should switch to `sprite`
    fn on_sprite_change(&mut self, sprite: Sprite, scheduled_time: f64);
}

impl StepListener for Vec<StepEvent> {
    fn on_foot_tone(&mut self, foot: Foot, note: Note, scheduled_time: f64) {
        self.push(StepEvent::FootTone {
            foot,
            note,
            time: scheduled_time,
        });
    }

    fn on_sprite_change(&mut self, sprite: Sprite, scheduled_time: f64) {
        self.push(StepEvent::SpriteChange {
            sprite,
            time: scheduled_time,
        });
    }
}

/// What the scheduler puts on the clock
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    /// Playback generation the event belongs to
    generation: u64,
    kind: ScheduledKind,
}

#[derive(Debug, Clone, PartialEq)]
enum ScheduledKind {
    Action(Action),
    /// Materialize the cycle starting at `cycle_start` (fires up to `lookahead` early)
    Boundary { cycle_start: f64 },
    /// The materialized cycle becomes the current one
    CycleStart { cycle_start: f64 },
}

/// Drives continuous playback of a [`StepSequence`]
///
/// State machine: `Stopped -> Running` via [`start`](Self::start),
/// `Running -> Running` via [`apply_sequence`](Self::apply_sequence) or a
/// boundary promotion, `Running -> Stopped` via [`stop`](Self::stop).
///
/// Lookahead: each cycle's actions are put on the clock
/// `min(lookahead, duration / 2)` before the cycle starts. At that moment the
/// pending sequence is committed to the next cycle, so a sequence applied
/// later lands one cycle after. [`current_sequence`](Self::current_sequence)
/// and [`cycle_anchor`](Self::cycle_anchor) still describe the cycle that is
/// playing until its boundary time is actually reached.
pub struct StepScheduler<C = EventClock<ScheduledEvent>> {
    clock: C,
    state: TransportState,
    current: Option<StepSequence>,
    pending: Option<StepSequence>,
    /// Committed for the next cycle, already on the clock
    upcoming: Option<StepSequence>,
    cycle_anchor: f64,
    /// Bumped on every stop so stale events on a shared clock are ignored
    generation: u64,
    /// Handles of events this scheduler still has on the clock
    handles: Vec<ClockHandle>,
    /// How far ahead of a cycle end the next cycle is materialized (seconds)
    lookahead: f64,
}

impl StepScheduler<EventClock<ScheduledEvent>> {
    /// Scheduler on a private clock starting at time zero
    pub fn new(lookahead: f64) -> Self {
        Self::with_clock(EventClock::new(), lookahead)
    }
}

impl<C: LogicalClock<ScheduledEvent>> StepScheduler<C> {
    /// Scheduler driving `clock`, stopped
    pub fn with_clock(clock: C, lookahead: f64) -> Self {
        assert!(
            lookahead.is_finite() && lookahead >= 0.0,
            "Lookahead must be finite and >= 0"
        );

        Self {
            clock,
            state: TransportState::Stopped,
            current: None,
            pending: None,
            upcoming: None,
            cycle_anchor: 0.0,
            generation: 0,
            handles: Vec::with_capacity(32),
            lookahead,
        }
    }

    /// Get playback state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Check if playing
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Sequence of the cycle playing now
    pub fn current_sequence(&self) -> Option<&StepSequence> {
        self.current.as_ref()
    }

    /// Sequence waiting for the next boundary, if any
    pub fn pending_sequence(&self) -> Option<&StepSequence> {
        self.pending.as_ref()
    }

    /// Clock time at which the cycle playing now began
    pub fn cycle_anchor(&self) -> f64 {
        self.cycle_anchor
    }

    /// Current transport time
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Get the underlying clock (read-only)
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start playing `sequence` from the current transport time
    ///
    /// Any previous playback is fully stopped first.
    pub fn start(&mut self, sequence: StepSequence) {
        self.stop();

        let now = self.clock.now();
        self.current = Some(sequence);
        self.state = TransportState::Running;
        self.cycle_anchor = now;
        self.materialize(now, false);
    }

    /// Switch to `sequence` at the next cycle boundary, or start if stopped
    pub fn apply_sequence(&mut self, sequence: StepSequence) {
        if !self.state.is_running() {
            self.start(sequence);
            return;
        }

        self.pending = Some(sequence);
    }

    /// Cancel everything this scheduler has on the clock. No-op when stopped.
    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            self.clock.clear(handle);
        }
        self.generation = self.generation.wrapping_add(1);

        self.state = TransportState::Stopped;
        self.current = None;
        self.pending = None;
        self.upcoming = None;
    }

    /// Advance transport time to `time`, running every due event in order
    pub fn advance_to(&mut self, time: f64, listener: &mut impl StepListener) {
        while let Some(fired) = self.clock.pop_due(time) {
            if let Some(index) = self.handles.iter().position(|h| *h == fired.handle) {
                self.handles.swap_remove(index);
            }

            if fired.event.generation != self.generation {
                continue;
            }

            match fired.event.kind {
                ScheduledKind::Action(action) => Self::execute(action, fired.time, listener),
                ScheduledKind::Boundary { cycle_start } => self.schedule_cycle(cycle_start),
                ScheduledKind::CycleStart { cycle_start } => self.begin_cycle(cycle_start),
            }
        }

        self.clock.advance_to(time);
    }

    fn execute(action: Action, scheduled_time: f64, listener: &mut impl StepListener) {
        match action {
            Action::Tone { foot, note, .. } => listener.on_foot_tone(foot, note, scheduled_time),
            Action::SpriteChange { sprite, .. } => {
                listener.on_sprite_change(sprite, scheduled_time)
            }
        }
    }

    /// Commit the sequence for the cycle at `cycle_start` and put it on the clock
    ///
    /// The only place a pending sequence is taken.
    fn schedule_cycle(&mut self, cycle_start: f64) {
        if let Some(next) = self.pending.take() {
            self.upcoming = Some(next);
        }
        self.materialize(cycle_start, true);
    }

    /// The boundary time has been reached: the committed cycle is now playing
    fn begin_cycle(&mut self, cycle_start: f64) {
        if let Some(next) = self.upcoming.take() {
            self.current = Some(next);
        }
        self.cycle_anchor = cycle_start;
    }

    /// Schedule one cycle's actions plus the boundary that materializes the next
    fn materialize(&mut self, cycle_start: f64, announce: bool) {
        let Some(sequence) = self.upcoming.as_ref().or(self.current.as_ref()) else {
            return;
        };

        if announce {
            let handle = self.clock.schedule_at(
                cycle_start,
                ScheduledEvent {
                    generation: self.generation,
                    kind: ScheduledKind::CycleStart { cycle_start },
                },
            );
            self.handles.push(handle);
        }

        for action in sequence.actions() {
            let handle = self.clock.schedule_at(
                cycle_start + action.offset(),
                ScheduledEvent {
                    generation: self.generation,
                    kind: ScheduledKind::Action(*action),
                },
            );
            self.handles.push(handle);
        }

        let next_cycle_start = cycle_start + sequence.duration();
        let lookahead = self.lookahead.min(sequence.duration() / 2.0);
        let handle = self.clock.schedule_at(
            next_cycle_start - lookahead,
            ScheduledEvent {
                generation: self.generation,
                kind: ScheduledKind::Boundary {
                    cycle_start: next_cycle_start,
                },
            },
        );
        self.handles.push(handle);
    }
}
