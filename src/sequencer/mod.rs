// Sequencer module
// Logical clock, transport bookkeeping and the step scheduler driven by them

pub mod clock;
pub mod controller;
pub mod scheduler;
pub mod transport;

pub use clock::{ClockHandle, EventClock, FiredEvent, LogicalClock};
pub use controller::{ParameterError, StepController, StepParameters};
pub use scheduler::{ScheduledEvent, StepListener, StepScheduler};
pub use transport::{BufferWindow, SampleTransport, TransportState};
