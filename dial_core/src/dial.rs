//! `Dial`: the single owned state capsule.
//!
//! Couples the pulse decoder with its completion timers in one serial
//! timebase. Whoever owns a `Dial` is the only writer; `service` runs one on a
//! worker thread, tests drive one directly with virtual time.

use crate::config::DialTiming;
use crate::decoder::{DecoderState, DialSnapshot, EdgeOutcome, PulseDecoder};
use crate::digits::DialedNumber;
use crate::timers::{CompletionTimers, TimerKind};
use dial_traits::EdgeEvent;

#[derive(Debug, Clone)]
pub struct Dial {
    timing: DialTiming,
    decoder: PulseDecoder,
    timers: CompletionTimers,
}

impl Dial {
    pub fn new(timing: DialTiming) -> Self {
        Self {
            decoder: PulseDecoder::new(&timing),
            timers: CompletionTimers::new(&timing),
            timing,
        }
    }

    #[inline]
    pub fn timing(&self) -> &DialTiming {
        &self.timing
    }

    #[inline]
    pub fn decoder(&self) -> &PulseDecoder {
        &self.decoder
    }

    #[inline]
    pub fn state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Classify an edge. Timers due at or before the edge fire first.
    ///
    /// Every edge clears the ready flag, so every edge that leaves the line
    /// idle or half-open restarts the max-inter-digit countdown.
    pub fn handle_edge(&mut self, ev: EdgeEvent) -> EdgeOutcome {
        self.advance_to(ev.at_ms);
        let outcome = self.decoder.on_edge(ev.edge, ev.at_ms);
        if outcome.rearms_timers() {
            self.timers.rearm(ev.at_ms);
        } else if outcome.arms_max_timer() {
            self.timers.arm_max(ev.at_ms);
        }
        outcome
    }

    /// Fire every timer due at or before `now_ms`; returns how many fired.
    pub fn advance_to(&mut self, now_ms: u64) -> usize {
        let mut fired = 0;
        while let Some(kind) = self.timers.pop_expired(now_ms) {
            self.fire(kind);
            fired += 1;
        }
        fired
    }

    fn fire(&mut self, kind: TimerKind) {
        tracing::trace!(?kind, "completion timer fired");
        match kind {
            TimerKind::InterDigit => {
                self.decoder.on_inter_digit_timeout();
            }
            TimerKind::MaxInterDigit => {
                self.decoder.on_max_inter_digit_timeout();
            }
        }
    }

    /// Earliest armed timer deadline.
    #[inline]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn try_take_number(&mut self) -> Option<DialedNumber> {
        self.decoder.try_take_number()
    }

    pub fn reset_to_idle(&mut self) {
        self.decoder.reset_to_idle();
    }

    pub fn snapshot(&self) -> DialSnapshot {
        self.decoder.snapshot()
    }
}
