// Step renderer - Runs the scheduler inside the audio callback
//
// Each buffer: drain UI commands, advance the logical clock across the
// buffer's time window, start tones at the sample offset of their scheduled
// time, then mix. Shared by the cpal engine and offline export.
//
// Never logs: transport changes and rejected commands go to the UI as
// step events.

use crate::audio::output::{flush_denormals_to_zero, soft_clip, write_mono_frame};
use crate::audio::tone::{ToneBank, TonePlayer};
use crate::config::{ConfigError, MetronomeConfig};
use crate::messaging::channels::{CommandConsumer, StepEventProducer};
use crate::messaging::command::Command;
use crate::messaging::notification::StepEvent;
use crate::pattern::{Foot, Note, Sprite};
use crate::sequencer::{
    BufferWindow, EventClock, SampleTransport, ScheduledEvent, StepController, StepListener,
    StepScheduler,
};
use cpal::{FromSample, Sample};
use ringbuf::traits::{Consumer, Producer};

pub type RenderController = StepController<EventClock<ScheduledEvent>>;

fn push_event(events: Option<&mut StepEventProducer>, dropped: &mut u64, event: StepEvent) {
    if let Some(events) = events {
        if events.try_push(event).is_err() {
            *dropped += 1;
        }
    }
}

/// Listener used while one buffer is being scheduled
struct BufferListener<'a> {
    player: &'a mut TonePlayer,
    events: Option<&'a mut StepEventProducer>,
    window: BufferWindow,
    sample_rate: f64,
    dropped: &'a mut u64,
}

impl BufferListener<'_> {
    fn publish(&mut self, event: StepEvent) {
        push_event(self.events.as_deref_mut(), self.dropped, event);
    }
}

impl StepListener for BufferListener<'_> {
    fn on_foot_tone(&mut self, foot: Foot, note: Note, scheduled_time: f64) {
        let offset = self.window.offset_of(scheduled_time, self.sample_rate);
        self.player.trigger(note, offset);
        self.publish(StepEvent::FootTone {
            foot,
            note,
            time: scheduled_time,
        });
    }

    fn on_sprite_change(&mut self, sprite: Sprite, scheduled_time: f64) {
        self.publish(StepEvent::SpriteChange {
            sprite,
            time: scheduled_time,
        });
    }
}

/// Audio-thread owner of the step controller
pub struct StepRenderer {
    controller: RenderController,
    transport: SampleTransport,
    player: TonePlayer,
    commands: Option<CommandConsumer>,
    events: Option<StepEventProducer>,
    dropped_events: u64,
    rejected_commands: u64,
}

impl StepRenderer {
    /// Build a stopped renderer. Fails if `config` does not validate.
    pub fn new(sample_rate: f32, config: &MetronomeConfig) -> Result<Self, ConfigError> {
        let scheduler = StepScheduler::new(config.boundary_lookahead);
        let controller = StepController::new(scheduler, config)?;
        let bank = ToneBank::new(sample_rate, &config.limits, &config.tone);

        Ok(Self {
            controller,
            transport: SampleTransport::new(sample_rate as f64),
            player: TonePlayer::new(bank, config.tone.volume),
            commands: None,
            events: None,
            dropped_events: 0,
            rejected_commands: 0,
        })
    }

    /// Receive commands from the UI through `commands`
    pub fn with_commands(mut self, commands: CommandConsumer) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Publish step events to the UI through `events`
    pub fn with_events(mut self, events: StepEventProducer) -> Self {
        self.events = Some(events);
        self
    }

    /// Read access to the step controller
    pub fn controller(&self) -> &RenderController {
        &self.controller
    }

    /// Direct control, for offline rendering where no UI thread exists
    pub fn controller_mut(&mut self) -> &mut RenderController {
        &mut self.controller
    }

    /// Sample position of the next buffer
    pub fn transport(&self) -> &SampleTransport {
        &self.transport
    }

    /// Step events lost because the UI channel was full
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Commands from the UI that were refused
    pub fn rejected_commands(&self) -> u64 {
        self.rejected_commands
    }

    fn drain_commands(&mut self) {
        let Some(commands) = self.commands.as_mut() else {
            return;
        };

        while let Some(command) = commands.try_pop() {
            let was_running = self.controller.scheduler().is_running();
            let result = self.controller.handle_command(command);
            let scheduler = self.controller.scheduler();
            let time = scheduler.now();

            let event = match result {
                Ok(()) => {
                    let restarted = matches!(command, Command::Play);
                    if !restarted && was_running == scheduler.is_running() {
                        continue;
                    }
                    StepEvent::Transport {
                        state: scheduler.state(),
                        time,
                    }
                }
                // Rejected input leaves the current pattern playing
                Err(error) => {
                    self.rejected_commands += 1;
                    StepEvent::CommandRejected { error, time }
                }
            };
            push_event(self.events.as_mut(), &mut self.dropped_events, event);
        }
    }

    /// Run the scheduler over the next `frames` samples
    fn schedule_buffer(&mut self, frames: usize) {
        self.drain_commands();

        let window = self.transport.advance(frames);
        let sample_rate = self.transport.sample_rate();

        // Everything that rounds to a sample inside this buffer
        let until = ((window.start_samples + frames as u64) as f64 - 0.5) / sample_rate;

        let mut listener = BufferListener {
            player: &mut self.player,
            events: self.events.as_mut(),
            window,
            sample_rate,
            dropped: &mut self.dropped_events,
        };
        self.controller.advance_to(until, &mut listener);
    }

    fn next_sample(&mut self) -> f32 {
        soft_clip(flush_denormals_to_zero(self.player.next_sample()))
    }

    /// Fill an interleaved device buffer
    pub fn render_interleaved<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        let channels = channels.max(1);
        let frames = data.len() / channels;
        if frames == 0 {
            return;
        }

        self.schedule_buffer(frames);
        for frame in data.chunks_mut(channels) {
            let sample = self.next_sample();
            write_mono_frame(sample, frame);
        }
    }

    /// Fill a mono f32 buffer
    pub fn render(&mut self, out: &mut [f32]) {
        self.render_interleaved(out, 1);
    }
}
