//! Background decoding service.
//!
//! One worker thread owns the `Dial`. Edges, drain requests and snapshots
//! arrive as messages on a single bounded channel, and the completion timers
//! fire on that same thread when `recv_timeout` runs out at the nearest
//! deadline. Every write to decoder state is therefore serialized, and the
//! check-and-clear of a drain cannot interleave with an edge or a timer.
//!
//! `EdgeSender` is the handle handed to interrupt callbacks: it stamps the
//! edge with the service clock and `try_send`s it without blocking.
//!
//! Safety: each `DialService` spawns exactly one thread, shut down and joined
//! when the service is dropped.
use crate::config::DialTiming;
use crate::decoder::DialSnapshot;
use crate::dial::Dial;
use crate::digits::DialedNumber;
use crate::error::{BuildError, DialError};
use crossbeam_channel as xch;
use dial_traits::clock::Clock;
use dial_traits::{Edge, EdgeEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Queue depth between interrupt context and the worker. One digit is at
/// most 20 edges.
pub const DEFAULT_QUEUE_DEPTH: usize = 256;
/// Longest the worker sleeps without a deadline before checking shutdown.
const IDLE_TICK_MS: u64 = 250;
/// How long a drain or snapshot request waits for the worker's answer.
const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

enum Msg {
    Edge(EdgeEvent),
    Take(xch::Sender<Option<DialedNumber>>),
    Snapshot(xch::Sender<DialSnapshot>),
    Shutdown,
}

type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Cloneable, non-blocking edge entry point.
#[derive(Clone)]
pub struct EdgeSender {
    tx: xch::Sender<Msg>,
    clock: SharedClock,
    epoch: Instant,
    dropped: Arc<AtomicU64>,
}

impl EdgeSender {
    /// Stamp `edge` with the service clock and queue it.
    #[inline]
    pub fn send(&self, edge: Edge) -> bool {
        let at_ms = self.clock.ms_since(self.epoch);
        self.send_at(EdgeEvent::new(edge, at_ms))
    }

    /// Queue a pre-stamped edge. `ev.at_ms` must be in the service timebase
    /// (see [`DialService::now_ms`]) and not earlier than previous edges.
    #[inline]
    pub fn send_at(&self, ev: EdgeEvent) -> bool {
        if self.tx.try_send(Msg::Edge(ev)).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Wrap this sender as a `PulseInput` sink.
    pub fn into_sink(self) -> dial_traits::EdgeSink {
        Box::new(move |edge| {
            let _ = self.send(edge);
        })
    }
}

pub struct DialService {
    sender: EdgeSender,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl DialService {
    /// Start the worker on the real monotonic clock.
    pub fn start(timing: DialTiming) -> Result<Self, BuildError> {
        Self::builder().with_timing(timing).build()
    }

    pub fn spawn<C: Clock + Send + Sync + 'static>(
        timing: DialTiming,
        clock: C,
        queue_depth: usize,
    ) -> Result<Self, BuildError> {
        timing.validate()?;
        if queue_depth == 0 {
            return Err(BuildError::ZeroQueueDepth);
        }
        let (tx, rx) = xch::bounded(queue_depth);
        let clock: SharedClock = Arc::new(clock);
        let epoch = clock.now();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let worker_clock = clock.clone();

        let join_handle = std::thread::Builder::new()
            .name("dial-decoder".into())
            .spawn(move || worker(Dial::new(timing), rx, worker_clock, epoch, shutdown_clone))
            .map_err(|e| BuildError::Spawn(e.to_string()))?;

        tracing::debug!(?timing, queue_depth, "dial service started");
        Ok(Self {
            sender: EdgeSender {
                tx,
                clock,
                epoch,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            shutdown,
            join_handle: Some(join_handle),
        })
    }

    /// Handle for edge producers.
    pub fn sender(&self) -> EdgeSender {
        self.sender.clone()
    }

    /// Current time in the service timebase.
    pub fn now_ms(&self) -> u64 {
        self.sender.clock.ms_since(self.sender.epoch)
    }

    /// Edges lost because the queue was full.
    pub fn dropped_edges(&self) -> u64 {
        self.sender.dropped.load(Ordering::Relaxed)
    }

    /// Drain the dialed number if the session is complete.
    pub fn try_take_number(&self) -> Option<DialedNumber> {
        let (reply_tx, reply_rx) = xch::bounded(1);
        self.sender.tx.send(Msg::Take(reply_tx)).ok()?;
        reply_rx.recv_timeout(REPLY_TIMEOUT).ok().flatten()
    }

    pub fn snapshot(&self) -> Result<DialSnapshot, DialError> {
        let (reply_tx, reply_rx) = xch::bounded(1);
        self.sender
            .tx
            .send(Msg::Snapshot(reply_tx))
            .map_err(|_| DialError::Disconnected)?;
        reply_rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| DialError::Disconnected)
    }
}

fn worker(
    mut dial: Dial,
    rx: xch::Receiver<Msg>,
    clock: SharedClock,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("dial worker received shutdown signal");
            break;
        }
        let now = clock.ms_since(epoch);
        let wait_ms = dial
            .next_deadline()
            .map_or(IDLE_TICK_MS, |d| d.saturating_sub(now))
            .min(IDLE_TICK_MS);

        match rx.recv_timeout(Duration::from_millis(wait_ms)) {
            Ok(Msg::Edge(ev)) => {
                dial.handle_edge(ev);
            }
            Ok(Msg::Take(reply)) => {
                let _ = reply.send(dial.try_take_number());
            }
            Ok(Msg::Snapshot(reply)) => {
                let _ = reply.send(dial.snapshot());
            }
            Ok(Msg::Shutdown) | Err(xch::RecvTimeoutError::Disconnected) => break,
            Err(xch::RecvTimeoutError::Timeout) => {
                dial.advance_to(clock.ms_since(epoch));
            }
        }
    }
    tracing::trace!("dial worker exiting cleanly");
}

impl Drop for DialService {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Wake the worker if it is parked in recv_timeout.
        let _ = self.sender.tx.try_send(Msg::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("dial worker joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "dial worker panicked during shutdown");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dial_traits::clock::MonotonicClock;

    #[test]
    fn rejects_invalid_timing() {
        let t = DialTiming {
            tolerance_ms: 100,
            ..DialTiming::default()
        };
        assert!(DialService::start(t).is_err());
        assert!(matches!(
            DialService::spawn(DialTiming::default(), MonotonicClock::new(), 0),
            Err(BuildError::ZeroQueueDepth)
        ));
    }

    #[test]
    fn idle_service_has_nothing_to_take() {
        let svc = DialService::start(DialTiming::default()).expect("start");
        assert_eq!(svc.try_take_number(), None);
        let snap = svc.snapshot().expect("snapshot");
        assert!(snap.ready);
        assert!(snap.pending.is_empty());
    }
}
