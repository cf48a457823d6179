//! Synthetic pulse trains: the edges a dial emits for a number.
//!
//! Each digit starts with a falling edge (contact opens) and alternates break
//! and make phases until its last rising edge; `digit_gap_ms` of silence
//! separates digits. Timestamps start at `start_ms`.

use crate::config::DialTiming;
use crate::digits::{DialedNumber, Digit};
use dial_traits::{Edge, EdgeEvent};

/// Edges for a single digit, beginning at `start_ms`. Returns the events and
/// the time of the final edge.
pub fn digit_edges(
    digit: Digit,
    make_ms: u64,
    break_ms: u64,
    start_ms: u64,
) -> (Vec<EdgeEvent>, u64) {
    let n = digit.pulses();
    let mut out = Vec::with_capacity(usize::from(n) * 2);
    let mut t = start_ms;
    out.push(EdgeEvent::new(Edge::Falling, t));
    for i in 0..n {
        t += break_ms;
        out.push(EdgeEvent::new(Edge::Rising, t));
        if i + 1 < n {
            t += make_ms;
            out.push(EdgeEvent::new(Edge::Falling, t));
        }
    }
    (out, t)
}

/// Edges for a whole number at nominal timing.
pub fn number_edges(
    number: &DialedNumber,
    timing: &DialTiming,
    digit_gap_ms: u64,
    start_ms: u64,
) -> Vec<EdgeEvent> {
    let mut out = Vec::new();
    let mut t = start_ms;
    for (i, &d) in number.digits().iter().enumerate() {
        if i > 0 {
            t += digit_gap_ms;
        }
        let (edges, end) = digit_edges(d, timing.make_ms, timing.break_ms, t);
        out.extend(edges);
        t = end;
    }
    out
}

/// A digit gap halfway between the two timeouts: long enough to close each
/// digit, short enough to keep the number open.
pub fn default_digit_gap(timing: &DialTiming) -> u64 {
    timing
        .inter_digit_ms
        .saturating_add(timing.max_inter_digit_ms.saturating_sub(timing.inter_digit_ms) / 2)
}
