//! Edge classifier, pulse counter and digit buffer.
//!
//! `PulseDecoder` is a plain state machine: it never looks at a clock and
//! never arms timers itself. Callers feed it edges with timestamps, tell it
//! when either completion timer fired, and re-arm their timers whenever
//! [`EdgeOutcome::rearms_timers`] or [`EdgeOutcome::arms_max_timer`] says so.
//! See `dial::Dial` for the owner that does exactly that.
//!
//! Timing policy: a make phase outside its window is tolerated (the line still
//! advances to `Break`), while a break phase outside its window discards the
//! pulse train. Break timing is what separates real pulses from contact noise.

use crate::config::DialTiming;
use crate::digits::{DialedNumber, Digit, MAX_PULSES};
use dial_traits::Edge;
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

/// Initial capacity of the digit buffer; covers international numbers.
const DIGIT_CAPACITY: usize = 32;

/// Which half-cycle of a pulse the line is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    #[default]
    Idle,
    Make,
    Break,
}

/// Result of classifying one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// First edge after idle opened a half-cycle. No timing check applies.
    HalfCycleStarted(DecoderState),
    /// Make phase ended. `in_window` is false when its duration was out of
    /// range and the advance was tolerated anyway.
    BreakStarted { in_window: bool },
    /// Break phase ended inside its window; `pulses` is the running count.
    PulseAccepted { pulses: u8 },
    /// Edge direction does not match the current half-cycle.
    TransitionIgnored,
    /// Out-of-range break (or an overlong train): count discarded.
    ResetToIdle,
}

impl EdgeOutcome {
    /// Whether both completion timers must be re-armed from this edge.
    #[inline]
    pub fn rearms_timers(&self) -> bool {
        matches!(
            self,
            EdgeOutcome::BreakStarted { .. } | EdgeOutcome::PulseAccepted { .. }
        )
    }

    /// Whether only the max-inter-digit timer must restart from this edge.
    /// These edges clear the ready flag without arming anything else, so the
    /// long timeout is what hands the number back.
    #[inline]
    pub fn arms_max_timer(&self) -> bool {
        matches!(
            self,
            EdgeOutcome::HalfCycleStarted(_) | EdgeOutcome::ResetToIdle
        )
    }
}

/// Read-only view of the decoder, for status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialSnapshot {
    pub state: DecoderState,
    pub pulses: u8,
    pub pending: Vec<Digit>,
    pub ready: bool,
}

#[derive(Debug, Clone)]
pub struct PulseDecoder {
    make_window: RangeInclusive<u64>,
    break_window: RangeInclusive<u64>,
    state: DecoderState,
    pulses: u8,
    digits: Vec<Digit>,
    ready: bool,
    last_edge_ms: u64,
}

impl PulseDecoder {
    pub fn new(timing: &DialTiming) -> Self {
        Self {
            make_window: timing.make_window(),
            break_window: timing.break_window(),
            state: DecoderState::Idle,
            pulses: 0,
            digits: Vec::with_capacity(DIGIT_CAPACITY),
            ready: true,
            last_edge_ms: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Pulses counted so far in the digit being dialed.
    #[inline]
    pub fn pulse_count(&self) -> u8 {
        self.pulses
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Finalized digits not yet taken by the consumer.
    #[inline]
    pub fn pending_digits(&self) -> &[Digit] {
        &self.digits
    }

    #[inline]
    pub fn last_edge_ms(&self) -> u64 {
        self.last_edge_ms
    }

    pub fn snapshot(&self) -> DialSnapshot {
        DialSnapshot {
            state: self.state,
            pulses: self.pulses,
            pending: self.digits.clone(),
            ready: self.ready,
        }
    }

    /// Classify one edge observed at `at_ms`.
    pub fn on_edge(&mut self, edge: Edge, at_ms: u64) -> EdgeOutcome {
        let duration = at_ms.saturating_sub(self.last_edge_ms);
        self.last_edge_ms = at_ms;
        self.ready = false;

        let outcome = match (self.state, edge) {
            (DecoderState::Idle, Edge::Rising) => {
                self.state = DecoderState::Make;
                EdgeOutcome::HalfCycleStarted(DecoderState::Make)
            }
            (DecoderState::Idle, Edge::Falling) => {
                self.state = DecoderState::Break;
                EdgeOutcome::HalfCycleStarted(DecoderState::Break)
            }
            (DecoderState::Make, Edge::Falling) => {
                let in_window = self.make_window.contains(&duration);
                if !in_window {
                    debug!(duration_ms = duration, "make phase out of range; tolerated");
                }
                self.state = DecoderState::Break;
                EdgeOutcome::BreakStarted { in_window }
            }
            (DecoderState::Break, Edge::Rising) => {
                if !self.break_window.contains(&duration) {
                    warn!(
                        duration_ms = duration,
                        pulses = self.pulses,
                        "break phase out of range; resetting to idle"
                    );
                    self.reset_to_idle();
                    EdgeOutcome::ResetToIdle
                } else if self.pulses >= MAX_PULSES {
                    warn!(
                        pulses = self.pulses,
                        "pulse train longer than any digit; resetting to idle"
                    );
                    self.reset_to_idle();
                    EdgeOutcome::ResetToIdle
                } else {
                    self.pulses += 1;
                    self.state = DecoderState::Make;
                    EdgeOutcome::PulseAccepted {
                        pulses: self.pulses,
                    }
                }
            }
            (DecoderState::Make, Edge::Rising) | (DecoderState::Break, Edge::Falling) => {
                EdgeOutcome::TransitionIgnored
            }
        };
        debug!(?edge, at_ms, duration_ms = duration, ?outcome, "edge");
        outcome
    }

    /// Drop the in-progress count and return to `Idle`.
    pub fn reset_to_idle(&mut self) {
        self.state = DecoderState::Idle;
        self.pulses = 0;
    }

    /// Short timeout: the current digit is complete, more may follow.
    pub fn on_inter_digit_timeout(&mut self) -> Option<Digit> {
        let digit = self.finalize_digit();
        if let Some(d) = digit {
            info!(digit = d.value(), "digit dialed");
        }
        self.state = DecoderState::Idle;
        digit
    }

    /// Long timeout: the number is complete and may be read.
    pub fn on_max_inter_digit_timeout(&mut self) -> Option<Digit> {
        let digit = self.finalize_digit();
        if let Some(d) = digit {
            warn!(
                digit = d.value(),
                "finalizing digit due to max timeout while pulses mid-flight"
            );
        }
        self.state = DecoderState::Idle;
        self.ready = true;
        digit
    }

    fn finalize_digit(&mut self) -> Option<Digit> {
        if self.pulses == 0 {
            return None;
        }
        let digit = Digit::from_pulses(self.pulses);
        self.pulses = 0;
        if let Some(d) = digit {
            self.digits.push(d);
        }
        digit
    }

    /// Take the dialed number if the session is over: ready, idle and at
    /// least one digit buffered. Otherwise leaves everything untouched.
    pub fn try_take_number(&mut self) -> Option<DialedNumber> {
        if !self.ready || self.state != DecoderState::Idle || self.digits.is_empty() {
            return None;
        }
        let digits = std::mem::replace(&mut self.digits, Vec::with_capacity(DIGIT_CAPACITY));
        let number = DialedNumber::new(digits);
        info!(number = %number, "number dialed");
        Some(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> PulseDecoder {
        PulseDecoder::new(&DialTiming::default())
    }

    /// Feed `n` nominal pulses starting from idle at `t`; returns the time of
    /// the last edge.
    fn pulses(d: &mut PulseDecoder, n: u8, mut t: u64) -> u64 {
        d.on_edge(Edge::Falling, t);
        for i in 0..n {
            t += 61;
            assert_eq!(
                d.on_edge(Edge::Rising, t),
                EdgeOutcome::PulseAccepted { pulses: i + 1 }
            );
            if i + 1 < n {
                t += 39;
                d.on_edge(Edge::Falling, t);
            }
        }
        t
    }

    #[test]
    fn idle_edges_open_a_half_cycle() {
        let mut d = decoder();
        assert_eq!(
            d.on_edge(Edge::Rising, 5),
            EdgeOutcome::HalfCycleStarted(DecoderState::Make)
        );
        let mut d = decoder();
        assert_eq!(
            d.on_edge(Edge::Falling, 5),
            EdgeOutcome::HalfCycleStarted(DecoderState::Break)
        );
    }

    #[test]
    fn every_edge_clears_ready() {
        let mut d = decoder();
        assert!(d.is_ready());
        d.on_edge(Edge::Rising, 1);
        assert!(!d.is_ready());
        d.on_max_inter_digit_timeout();
        assert!(d.is_ready());
        d.on_edge(Edge::Rising, 2);
        assert!(!d.is_ready());
    }

    #[test]
    fn wrong_direction_is_ignored_but_timestamp_moves() {
        let mut d = decoder();
        d.on_edge(Edge::Rising, 100);
        assert_eq!(d.on_edge(Edge::Rising, 140), EdgeOutcome::TransitionIgnored);
        assert_eq!(d.state(), DecoderState::Make);
        assert_eq!(d.last_edge_ms(), 140);
        // Duration is measured from the ignored edge: 40ms, in window.
        assert_eq!(
            d.on_edge(Edge::Falling, 180),
            EdgeOutcome::BreakStarted { in_window: true }
        );
    }

    #[test]
    fn out_of_range_make_is_tolerated() {
        let mut d = decoder();
        d.on_edge(Edge::Rising, 0);
        let out = d.on_edge(Edge::Falling, 200);
        assert_eq!(out, EdgeOutcome::BreakStarted { in_window: false });
        assert!(out.rearms_timers());
        assert!(!out.arms_max_timer());
        assert_eq!(d.state(), DecoderState::Break);
        assert_eq!(
            d.on_edge(Edge::Rising, 261),
            EdgeOutcome::PulseAccepted { pulses: 1 }
        );
    }

    #[test]
    fn out_of_range_break_resets() {
        let mut d = decoder();
        let t = pulses(&mut d, 3, 0);
        d.on_edge(Edge::Falling, t + 39);
        assert_eq!(
            d.on_edge(Edge::Rising, t + 39 + 80),
            EdgeOutcome::ResetToIdle
        );
        assert_eq!(d.state(), DecoderState::Idle);
        assert_eq!(d.pulse_count(), 0);
    }

    #[test]
    fn eleventh_pulse_resets() {
        let mut d = decoder();
        let t = pulses(&mut d, 10, 0);
        d.on_edge(Edge::Falling, t + 39);
        assert_eq!(d.on_edge(Edge::Rising, t + 100), EdgeOutcome::ResetToIdle);
        assert_eq!(d.pulse_count(), 0);
    }

    #[test]
    fn inter_digit_finalizes_without_ready() {
        let mut d = decoder();
        pulses(&mut d, 4, 0);
        assert_eq!(d.on_inter_digit_timeout().map(Digit::value), Some(4));
        assert_eq!(d.state(), DecoderState::Idle);
        assert!(!d.is_ready());
        assert_eq!(d.try_take_number(), None);
        // The max timer then finds nothing left to finalize.
        assert_eq!(d.on_max_inter_digit_timeout(), None);
        let n = d.try_take_number().expect("number");
        assert_eq!(n.compact(), "4");
        assert_eq!(d.try_take_number(), None);
    }

    #[test]
    fn max_timeout_maps_ten_to_zero() {
        let mut d = decoder();
        pulses(&mut d, 10, 0);
        assert_eq!(d.on_max_inter_digit_timeout().map(Digit::value), Some(0));
        assert_eq!(d.try_take_number().map(|n| n.compact()), Some("0".into()));
    }

    #[test]
    fn take_requires_idle() {
        let mut d = decoder();
        pulses(&mut d, 2, 0);
        d.on_max_inter_digit_timeout();
        d.ready = true;
        d.state = DecoderState::Make;
        assert_eq!(d.try_take_number(), None);
        assert_eq!(d.pending_digits().len(), 1);
    }
}
