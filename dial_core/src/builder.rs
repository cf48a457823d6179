//! Builder for `DialService`.
//!
//! Timing defaults to `DialTiming::default()` and the clock to the real
//! monotonic clock; `build()` validates timing before the worker starts.

use dial_traits::clock::{Clock, MonotonicClock};

use crate::config::DialTiming;
use crate::error::BuildError;
use crate::service::{DEFAULT_QUEUE_DEPTH, DialService};

#[derive(Debug, Clone)]
pub struct DialServiceBuilder<C = MonotonicClock> {
    timing: DialTiming,
    clock: C,
    queue_depth: usize,
}

impl Default for DialServiceBuilder<MonotonicClock> {
    fn default() -> Self {
        Self {
            timing: DialTiming::default(),
            clock: MonotonicClock::new(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl<C> DialServiceBuilder<C> {
    pub fn with_timing(mut self, timing: DialTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Bound on edges buffered between the interrupt and the worker.
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth;
        self
    }

    /// Replace the clock used to stamp edges and run the timers.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> DialServiceBuilder<C2> {
        DialServiceBuilder {
            timing: self.timing,
            clock,
            queue_depth: self.queue_depth,
        }
    }
}

impl<C: Clock + Send + Sync + 'static> DialServiceBuilder<C> {
    pub fn build(self) -> Result<DialService, BuildError> {
        DialService::spawn(self.timing, self.clock, self.queue_depth)
    }
}

impl DialService {
    pub fn builder() -> DialServiceBuilder {
        DialServiceBuilder::default()
    }
}
