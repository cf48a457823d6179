pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Logic-level transition observed on the pulse input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Low to high: start of a make phase.
    Rising,
    /// High to low: start of a break phase.
    Falling,
}

impl Edge {
    /// Edge that leaves the line at `high`.
    #[inline]
    pub fn from_level(high: bool) -> Self {
        if high { Edge::Rising } else { Edge::Falling }
    }
}

/// One edge stamped with a monotonic millisecond timestamp.
///
/// All events fed into one decoder must share a single timebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub edge: Edge,
    pub at_ms: u64,
}

impl EdgeEvent {
    #[inline]
    pub fn new(edge: Edge, at_ms: u64) -> Self {
        Self { edge, at_ms }
    }
}

/// Callback receiving edges from a [`PulseInput`]. Runs in interrupt-like
/// context: it must not block.
pub type EdgeSink = Box<dyn FnMut(Edge) + Send + 'static>;

/// Source of make/break transitions on a single input line.
///
/// Implementations report every transition exactly once, in order, without
/// coalescing rapid transitions.
pub trait PulseInput {
    fn subscribe(&mut self, sink: EdgeSink) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn unsubscribe(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
