use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Resumption priority. Lower values are served first at the same instant.
pub type Priority = i32;

#[derive(Debug)]
pub struct ScheduledEvent<E> {
    pub time: f64,
    pub priority: Priority,
    pub sequence_num: u64,
    pub event: E,
}

impl<E> PartialEq for ScheduledEvent<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for ScheduledEvent<E> {}

impl<E> PartialOrd for ScheduledEvent<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for ScheduledEvent<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Virtual clock plus the ordered set of pending resumptions.
///
/// Resumptions run in non-decreasing time order; ties go to the lower
/// priority value, then to the earlier insertion.
pub struct EventScheduler<E> {
    event_queue: BinaryHeap<ScheduledEvent<E>>,
    sequence_counter: u64,
    now: f64,
}

impl<E> EventScheduler<E> {
    /// Create a new EventScheduler with the clock at zero
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
            now: 0.0,
        }
    }

    /// Current virtual time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule an event to resume `delay` seconds from now
    ///
    /// Negative or non-finite delays are treated as zero so the clock can
    /// never run backwards.
    pub fn schedule_event(&mut self, event: E, delay: f64, priority: Priority) {
        let delay = if delay.is_finite() && delay > 0.0 { delay } else { 0.0 };
        let scheduled_event = ScheduledEvent {
            time: self.now + delay,
            priority,
            sequence_num: self.sequence_counter,
            event,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
    }

    /// Pop the earliest pending resumption if it is due before `horizon`,
    /// advancing the clock to its time
    pub fn advance_to_next(&mut self, horizon: f64) -> Option<E> {
        match self.event_queue.peek() {
            Some(next) if next.time < horizon => {}
            _ => return None,
        }

        let scheduled_event = self.event_queue.pop()?;
        self.now = scheduled_event.time;
        Some(scheduled_event.event)
    }

    /// Drive the event loop until virtual time reaches `until`
    ///
    /// Each due event is handed to `handler` together with the scheduler so
    /// the handler can schedule follow-up resumptions. Anything still pending
    /// at the horizon is discarded. Returns the number of events processed.
    pub fn run<F, Err>(&mut self, until: f64, mut handler: F) -> Result<u64, Err>
    where
        F: FnMut(&mut Self, E) -> Result<(), Err>,
    {
        let mut processed = 0;
        while let Some(event) = self.advance_to_next(until) {
            handler(&mut *self, event)?;
            processed += 1;
        }

        let discarded = self.discard_pending();
        if discarded > 0 {
            log::trace!(
                "[Scheduler] horizon {} reached, discarded {} pending resumptions",
                until,
                discarded
            );
        }
        self.now = self.now.max(until);
        Ok(processed)
    }

    /// Check if there are any events remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    /// Number of pending resumptions
    pub fn pending(&self) -> usize {
        self.event_queue.len()
    }

    /// Get the time of the next event without removing it
    pub fn peek_next_time(&self) -> Option<f64> {
        self.event_queue.peek().map(|event| event.time)
    }

    /// Drop every pending resumption, returning how many were dropped
    pub fn discard_pending(&mut self) -> usize {
        let count = self.event_queue.len();
        self.event_queue.clear();
        count
    }
}

impl<E> Default for EventScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
