//! Pulse sources for the dial decoder: a GPIO line on real hardware and a
//! simulated dial replaying a recorded or synthetic edge train.

pub mod error;
#[cfg(feature = "hardware")]
pub mod gpio;

use dial_traits::clock::{Clock, MonotonicClock};
use dial_traits::{EdgeEvent, EdgeSink, PulseInput};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

pub use error::HwError;
#[cfg(feature = "hardware")]
pub use gpio::GpioPulseInput;

/// Input bias resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    #[default]
    Down,
    Up,
    None,
}

/// Longest single sleep while replaying, so `unsubscribe` stays responsive.
const REPLAY_SLICE: Duration = Duration::from_millis(10);

/// Replays a fixed edge train in real time on its own thread.
///
/// Edge timestamps are relative: the first edge is delivered right after
/// `subscribe`, the rest at their offsets from it.
pub struct SimulatedDial<C = MonotonicClock> {
    edges: Arc<[EdgeEvent]>,
    clock: C,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedDial<MonotonicClock> {
    pub fn new(edges: Vec<EdgeEvent>) -> Self {
        Self::with_clock(edges, MonotonicClock::new())
    }
}

impl<C: Clock + Clone + Send + 'static> SimulatedDial<C> {
    pub fn with_clock(edges: Vec<EdgeEvent>, clock: C) -> Self {
        Self {
            edges: edges.into(),
            clock,
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// The train this dial replays.
    pub fn edges(&self) -> &[EdgeEvent] {
        &self.edges
    }

    /// Wall-clock length of the replay.
    pub fn duration(&self) -> Duration {
        match (self.edges.first(), self.edges.last()) {
            (Some(a), Some(b)) => Duration::from_millis(b.at_ms.saturating_sub(a.at_ms)),
            _ => Duration::ZERO,
        }
    }

    /// True once every edge has been delivered (or replay was stopped).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Block until the replay thread exits.
    pub fn join(&mut self) {
        if let Some(h) = self.handle.take()
            && h.join().is_err()
        {
            tracing::warn!("simulated dial thread panicked");
        }
    }
}

fn replay<C: Clock>(edges: &[EdgeEvent], clock: &C, stop: &AtomicBool, mut sink: EdgeSink) {
    let Some(first) = edges.first() else {
        return;
    };
    let start = clock.now();
    for ev in edges.iter() {
        let offset = Duration::from_millis(ev.at_ms.saturating_sub(first.at_ms));
        loop {
            if stop.load(Ordering::Relaxed) {
                tracing::debug!("simulated dial stopped");
                return;
            }
            let elapsed = clock.now().saturating_duration_since(start);
            let Some(remaining) = offset.checked_sub(elapsed).filter(|d| !d.is_zero()) else {
                break;
            };
            clock.sleep(remaining.min(REPLAY_SLICE));
        }
        tracing::trace!(edge = ?ev.edge, offset_ms = ?offset.as_millis(), "simulated edge");
        sink(ev.edge);
    }
    tracing::debug!(edges = edges.len(), "simulated dial finished");
}

impl<C: Clock + Clone + Send + 'static> PulseInput for SimulatedDial<C> {
    fn subscribe(&mut self, sink: EdgeSink) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.handle.is_some() {
            return Err(HwError::AlreadySubscribed.into());
        }
        self.stop.store(false, Ordering::Relaxed);
        let edges = self.edges.clone();
        let clock = self.clock.clone();
        let stop = self.stop.clone();
        let handle = std::thread::Builder::new()
            .name("simulated-dial".into())
            .spawn(move || replay(&edges, &clock, &stop, sink))
            .map_err(HwError::Io)?;
        self.handle = Some(handle);
        Ok(())
    }

    fn unsubscribe(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.stop.store(true, Ordering::Relaxed);
        self.join();
        Ok(())
    }
}

impl<C> Drop for SimulatedDial<C> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dial_traits::Edge;
    use std::sync::Mutex;

    fn collecting_sink() -> (EdgeSink, Arc<Mutex<Vec<Edge>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        (Box::new(move |e| s.lock().unwrap().push(e)), seen)
    }

    #[test]
    fn empty_train_finishes_immediately() {
        let mut d = SimulatedDial::new(Vec::new());
        let (sink, seen) = collecting_sink();
        d.subscribe(sink).unwrap();
        d.join();
        assert!(d.is_finished());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(d.duration(), Duration::ZERO);
    }

    #[test]
    fn second_subscribe_is_rejected() {
        let mut d = SimulatedDial::new(vec![EdgeEvent::new(Edge::Falling, 0)]);
        let (a, _) = collecting_sink();
        let (b, _) = collecting_sink();
        d.subscribe(a).unwrap();
        let err = d.subscribe(b).unwrap_err();
        assert!(err.to_string().contains("already"));
    }
}
