//! The two completion timers as restartable one-shot deadlines.
//!
//! Deadlines live in the same millisecond timebase as edge timestamps. Nothing
//! here sleeps; the owner decides when to ask which deadlines have passed.

use crate::config::DialTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Finalizes the current digit.
    InterDigit,
    /// Finalizes the current digit and the number.
    MaxInterDigit,
}

#[derive(Debug, Clone)]
pub struct CompletionTimers {
    inter_digit_ms: u64,
    max_inter_digit_ms: u64,
    inter_digit_due: Option<u64>,
    max_due: Option<u64>,
}

impl CompletionTimers {
    pub fn new(timing: &DialTiming) -> Self {
        Self {
            inter_digit_ms: timing.inter_digit_ms,
            max_inter_digit_ms: timing.max_inter_digit_ms,
            inter_digit_due: None,
            max_due: None,
        }
    }

    /// Restart both countdowns from `at_ms`, cancelling pending fires.
    #[inline]
    pub fn rearm(&mut self, at_ms: u64) {
        self.inter_digit_due = Some(at_ms.saturating_add(self.inter_digit_ms));
        self.max_due = Some(at_ms.saturating_add(self.max_inter_digit_ms));
    }

    /// Restart only the max-inter-digit countdown from `at_ms`.
    #[inline]
    pub fn arm_max(&mut self, at_ms: u64) {
        self.max_due = Some(at_ms.saturating_add(self.max_inter_digit_ms));
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::InterDigit => self.inter_digit_due.is_some(),
            TimerKind::MaxInterDigit => self.max_due.is_some(),
        }
    }

    /// Earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.inter_digit_due, self.max_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Disarm and return the earliest timer due at or before `now_ms`.
    /// The inter-digit timer wins a tie.
    pub fn pop_expired(&mut self, now_ms: u64) -> Option<TimerKind> {
        let inter = self.inter_digit_due.filter(|&d| d <= now_ms);
        let max = self.max_due.filter(|&d| d <= now_ms);
        match (inter, max) {
            (Some(i), Some(m)) if m < i => {
                self.max_due = None;
                Some(TimerKind::MaxInterDigit)
            }
            (Some(_), _) => {
                self.inter_digit_due = None;
                Some(TimerKind::InterDigit)
            }
            (None, Some(_)) => {
                self.max_due = None;
                Some(TimerKind::MaxInterDigit)
            }
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut t = CompletionTimers::new(&DialTiming::default());
        assert_eq!(t.next_deadline(), None);
        t.rearm(1000);
        assert_eq!(t.next_deadline(), Some(1500));
        assert_eq!(t.pop_expired(1499), None);
        assert_eq!(t.pop_expired(5000), Some(TimerKind::InterDigit));
        assert_eq!(t.pop_expired(5000), Some(TimerKind::MaxInterDigit));
        assert_eq!(t.pop_expired(5000), None);
    }

    #[test]
    fn rearm_supersedes_pending_fire() {
        let mut t = CompletionTimers::new(&DialTiming::default());
        t.rearm(0);
        t.rearm(400);
        assert_eq!(t.pop_expired(500), None);
        assert_eq!(t.pop_expired(900), Some(TimerKind::InterDigit));
        assert!(!t.is_armed(TimerKind::InterDigit));
        assert!(t.is_armed(TimerKind::MaxInterDigit));
        assert_eq!(t.next_deadline(), Some(3400));
    }

    #[test]
    fn arm_max_leaves_inter_digit_alone() {
        let mut t = CompletionTimers::new(&DialTiming::default());
        t.arm_max(100);
        assert!(!t.is_armed(TimerKind::InterDigit));
        assert_eq!(t.next_deadline(), Some(3100));

        t.rearm(200);
        t.arm_max(1000);
        assert_eq!(t.next_deadline(), Some(700));
        assert_eq!(t.pop_expired(3999), Some(TimerKind::InterDigit));
        assert_eq!(t.pop_expired(3999), None);
        assert_eq!(t.pop_expired(4000), Some(TimerKind::MaxInterDigit));
    }
}
