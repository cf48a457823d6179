//! Runtime timing configuration for the decoder.
//!
//! Separate from the TOML-deserialized `dial_config::Timing`; see
//! `conversions` for the mapping.

use crate::error::BuildError;
use std::ops::RangeInclusive;

/// Dial timing in milliseconds. Defaults describe a 10 pps dial with a 39/61
/// make/break ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialTiming {
    /// Nominal make (contact closed) phase.
    pub make_ms: u64,
    /// Nominal break (contact open) phase.
    pub break_ms: u64,
    /// Accepted deviation on either side of the nominal phases.
    pub tolerance_ms: u64,
    /// Silence after the last pulse edge that finalizes a digit.
    pub inter_digit_ms: u64,
    /// Silence after the last pulse edge that finalizes the number.
    pub max_inter_digit_ms: u64,
}

impl Default for DialTiming {
    fn default() -> Self {
        Self {
            make_ms: 39,
            break_ms: 61,
            tolerance_ms: 10,
            inter_digit_ms: 500,
            max_inter_digit_ms: 3000,
        }
    }
}

impl DialTiming {
    /// Accepted make durations, `[make - tol, make + tol]`.
    #[inline]
    pub fn make_window(&self) -> RangeInclusive<u64> {
        self.make_ms.saturating_sub(self.tolerance_ms)
            ..=self.make_ms.saturating_add(self.tolerance_ms)
    }

    /// Accepted break durations, `[break - tol, break + tol]`.
    #[inline]
    pub fn break_window(&self) -> RangeInclusive<u64> {
        self.break_ms.saturating_sub(self.tolerance_ms)
            ..=self.break_ms.saturating_add(self.tolerance_ms)
    }

    /// Nominal duration of one full pulse (break plus make).
    #[inline]
    pub fn pulse_period_ms(&self) -> u64 {
        self.make_ms.saturating_add(self.break_ms)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.make_ms == 0 || self.break_ms == 0 {
            return Err(BuildError::InvalidTiming("make_ms and break_ms must be > 0"));
        }
        if self.tolerance_ms >= self.make_ms || self.tolerance_ms >= self.break_ms {
            return Err(BuildError::InvalidTiming(
                "tolerance_ms must be smaller than make_ms and break_ms",
            ));
        }
        if self.inter_digit_ms <= *self.break_window().end() {
            return Err(BuildError::InvalidTiming(
                "inter_digit_ms must exceed the longest accepted break",
            ));
        }
        if self.max_inter_digit_ms <= self.inter_digit_ms {
            return Err(BuildError::InvalidTiming(
                "max_inter_digit_ms must exceed inter_digit_ms",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_windows() {
        let t = DialTiming::default();
        assert_eq!(t.make_window(), 29..=49);
        assert_eq!(t.break_window(), 51..=71);
        assert_eq!(t.pulse_period_ms(), 100);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn rejects_overlapping_timeouts() {
        let t = DialTiming {
            max_inter_digit_ms: 500,
            ..DialTiming::default()
        };
        assert!(matches!(t.validate(), Err(BuildError::InvalidTiming(_))));
    }

    #[test]
    fn rejects_inter_digit_inside_break_window() {
        let t = DialTiming {
            inter_digit_ms: 70,
            ..DialTiming::default()
        };
        assert!(t.validate().is_err());
    }
}
