//! `From` implementations bridging `dial_config` types to `dial_core` types.

use crate::config::DialTiming;

// ── DialTiming ───────────────────────────────────────────────────────────────

impl From<&dial_config::Timing> for DialTiming {
    fn from(c: &dial_config::Timing) -> Self {
        Self {
            make_ms: c.make_ms,
            break_ms: c.break_ms,
            tolerance_ms: c.tolerance_ms,
            inter_digit_ms: c.inter_digit_ms,
            max_inter_digit_ms: c.max_inter_digit_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_core_defaults() {
        let cfg = dial_config::Timing::default();
        assert_eq!(DialTiming::from(&cfg), DialTiming::default());
    }
}
