// Logical clock - Monotonic transport time with a queue of future events
//
// Events are plain values rather than closures: whoever owns the clock pops
// due events and dispatches them, which keeps every mutation of the owner's
// state inside its own call stack. The same implementation backs the
// real-time driver, offline export and tests.

/// Identifies one scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockHandle(u64);

/// An event whose time has come
#[derive(Debug, Clone, PartialEq)]
pub struct FiredEvent<E> {
    pub handle: ClockHandle,
    /// Time the event was scheduled for (not the time it was popped)
    pub time: f64,
    pub event: E,
}

/// Time source that runs events when transport time reaches them
pub trait LogicalClock<E> {
    /// Current transport time in seconds
    fn now(&self) -> f64;

    /// Queue `event` to fire at `time`
    fn schedule_at(&mut self, time: f64, event: E) -> ClockHandle;

    /// Remove one queued event. Returns false if it already fired or was cleared.
    fn clear(&mut self, handle: ClockHandle) -> bool;

    /// Remove every queued event
    fn cancel_all(&mut self);

    /// Pop the earliest event scheduled at or before `until`
    ///
    /// Events fire in time order; equal times fire in scheduling order.
    /// `now` moves forward to the popped event's time.
    fn pop_due(&mut self, until: f64) -> Option<FiredEvent<E>>;

    /// Move transport time forward to `time`
    fn advance_to(&mut self, time: f64);

    /// Number of queued events
    fn pending(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Entry<E> {
    time: f64,
    seq: u64,
    event: E,
}

/// Sorted-queue implementation of [`LogicalClock`]
///
/// A cycle only ever holds a handful of events, so a sorted Vec with
/// binary-search insertion beats a heap and keeps ordering fully deterministic.
#[derive(Debug, Clone)]
pub struct EventClock<E> {
    now: f64,
    next_seq: u64,
    queue: Vec<Entry<E>>,
}

impl<E> EventClock<E> {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a clock at `time`, which must be finite
    pub fn starting_at(time: f64) -> Self {
        assert!(time.is_finite(), "Clock time must be finite");
        Self {
            now: time,
            next_seq: 0,
            // Pre-allocated so the audio thread rarely reallocates
            queue: Vec::with_capacity(64),
        }
    }
}

impl<E> Default for EventClock<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> LogicalClock<E> for EventClock<E> {
    fn now(&self) -> f64 {
        self.now
    }

    fn schedule_at(&mut self, time: f64, event: E) -> ClockHandle {
        assert!(time.is_finite(), "Event time must be finite");

        let seq = self.next_seq;
        self.next_seq += 1;

        // Insert after every entry with time <= `time` so equal times stay FIFO
        let index = self.queue.partition_point(|entry| entry.time <= time);
        self.queue.insert(index, Entry { time, seq, event });

        ClockHandle(seq)
    }

    fn clear(&mut self, handle: ClockHandle) -> bool {
        match self.queue.iter().position(|entry| entry.seq == handle.0) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    fn cancel_all(&mut self) {
        self.queue.clear();
    }

    fn pop_due(&mut self, until: f64) -> Option<FiredEvent<E>> {
        if self.queue.first()?.time > until {
            return None;
        }

        let entry = self.queue.remove(0);
        self.now = self.now.max(entry.time);

        Some(FiredEvent {
            handle: ClockHandle(entry.seq),
            time: entry.time,
            event: entry.event,
        })
    }

    fn advance_to(&mut self, time: f64) {
        assert!(time.is_finite(), "Clock time must be finite");
        assert!(time >= self.now, "Clock cannot move backwards");
        self.now = time;
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
