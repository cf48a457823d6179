//! Digit and dialed-number value types.

use crate::error::DialError;
use std::fmt;
use std::str::FromStr;

/// Largest pulse train that maps to a digit (ten pulses dial `0`).
pub const MAX_PULSES: u8 = 10;

/// A single decimal digit, 0..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digit(u8);

impl Digit {
    /// Map a pulse count to its digit: 1..=9 pulses are themselves, 10 is `0`.
    #[inline]
    pub fn from_pulses(pulses: u8) -> Option<Self> {
        match pulses {
            1..=9 => Some(Self(pulses)),
            MAX_PULSES => Some(Self(0)),
            _ => None,
        }
    }

    #[inline]
    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Pulses a dial sends for this digit.
    #[inline]
    pub fn pulses(self) -> u8 {
        if self.0 == 0 { MAX_PULSES } else { self.0 }
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for Digit {
    type Error = DialError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        c.to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .and_then(Digit::new)
            .ok_or_else(|| DialError::InvalidNumber(c.to_string()))
    }
}

/// Digits of one completed dialing session, in dialing order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DialedNumber(Vec<Digit>);

impl DialedNumber {
    pub fn new(digits: Vec<Digit>) -> Self {
        Self(digits)
    }

    #[inline]
    pub fn digits(&self) -> &[Digit] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<Digit> {
        self.0.first().copied()
    }

    pub fn starts_with(&self, prefix: &DialedNumber) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Digits without separators, e.g. `8675309`.
    pub fn compact(&self) -> String {
        self.0.iter().map(|d| char::from(b'0' + d.value())).collect()
    }

    pub fn into_digits(self) -> Vec<Digit> {
        self.0
    }
}

impl fmt::Display for DialedNumber {
    /// Digits joined by `-`, e.g. `8-6-7-5-3-0-9`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl FromStr for DialedNumber {
    type Err = DialError;

    /// Accepts digits with optional `-` or space separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut digits = Vec::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '-' | ' ' => continue,
                _ => digits.push(
                    Digit::try_from(c).map_err(|_| DialError::InvalidNumber(s.to_string()))?,
                ),
            }
        }
        if digits.is_empty() {
            return Err(DialError::InvalidNumber(s.to_string()));
        }
        Ok(Self(digits))
    }
}

impl From<Vec<Digit>> for DialedNumber {
    fn from(v: Vec<Digit>) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_pulses_is_zero() {
        assert_eq!(Digit::from_pulses(10).map(Digit::value), Some(0));
        assert_eq!(Digit::from_pulses(1).map(Digit::value), Some(1));
        assert_eq!(Digit::from_pulses(0), None);
        assert_eq!(Digit::from_pulses(11), None);
    }

    #[test]
    fn zero_is_dialed_with_ten_pulses() {
        assert_eq!(Digit::new(0).map(Digit::pulses), Some(10));
        assert_eq!(Digit::new(7).map(Digit::pulses), Some(7));
        assert_eq!(Digit::new(10), None);
    }

    #[test]
    fn parses_and_renders() {
        let n: DialedNumber = "867-5309".parse().unwrap();
        assert_eq!(n.len(), 7);
        assert_eq!(n.to_string(), "8-6-7-5-3-0-9");
        assert_eq!(n.compact(), "8675309");
        assert_eq!(n.first().map(Digit::value), Some(8));
    }

    #[test]
    fn rejects_non_digits_and_empty() {
        assert!("12a".parse::<DialedNumber>().is_err());
        assert!("".parse::<DialedNumber>().is_err());
        assert!(" - ".parse::<DialedNumber>().is_err());
    }

    #[test]
    fn prefix_match() {
        let n: DialedNumber = "2125551234".parse().unwrap();
        let p: DialedNumber = "212".parse().unwrap();
        assert!(n.starts_with(&p));
        assert!(!p.starts_with(&n));
    }
}
