//! Lookup table from dialed numbers to actions.
//!
//! The decoder is agnostic to what a number means; this table is what the
//! consumer consults after draining one. Routes are checked in order and the
//! first match wins, so list exact numbers before prefixes they share.

use crate::digits::DialedNumber;
use crate::error::DialError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(DialedNumber),
    Prefix(DialedNumber),
}

impl Pattern {
    #[inline]
    pub fn matches(&self, number: &DialedNumber) -> bool {
        match self {
            Pattern::Exact(n) => n == number,
            Pattern::Prefix(p) => number.starts_with(p),
        }
    }
}

/// What to do when a route matches: a name for logs and an optional program
/// to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAction {
    pub name: String,
    pub command: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Dispatcher<A> {
    routes: Vec<(Pattern, A)>,
}

impl<A> Default for Dispatcher<A> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<A> Dispatcher<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: Pattern, action: A) -> Self {
        self.routes.push((pattern, action));
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First action whose pattern matches `number`.
    pub fn resolve(&self, number: &DialedNumber) -> Option<&A> {
        self.routes
            .iter()
            .find(|(p, _)| p.matches(number))
            .map(|(_, a)| a)
    }
}

impl TryFrom<&[dial_config::RouteCfg]> for Dispatcher<RouteAction> {
    type Error = DialError;

    fn try_from(routes: &[dial_config::RouteCfg]) -> Result<Self, Self::Error> {
        let mut d = Dispatcher::new();
        for r in routes {
            let pattern = match (&r.exact, &r.prefix) {
                (Some(e), None) => Pattern::Exact(e.parse()?),
                (None, Some(p)) => Pattern::Prefix(p.parse()?),
                _ => {
                    return Err(DialError::Config(format!(
                        "route {:?} must set exactly one of exact or prefix",
                        r.action
                    )));
                }
            };
            d = d.route(
                pattern,
                RouteAction {
                    name: r.action.clone(),
                    command: r.command.clone(),
                },
            );
        }
        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> DialedNumber {
        s.parse().unwrap()
    }

    #[test]
    fn first_match_wins() {
        let d = Dispatcher::new()
            .route(Pattern::Exact(n("8675309")), "jenny")
            .route(Pattern::Prefix(n("8")), "eight")
            .route(Pattern::Prefix(n("1")), "abba");
        assert_eq!(d.resolve(&n("8675309")), Some(&"jenny"));
        assert_eq!(d.resolve(&n("867")), Some(&"eight"));
        assert_eq!(d.resolve(&n("19")), Some(&"abba"));
        assert_eq!(d.resolve(&n("2")), None);
    }

    #[test]
    fn exact_does_not_match_longer_numbers() {
        let d = Dispatcher::new().route(Pattern::Exact(n("12")), ());
        assert!(d.resolve(&n("123")).is_none());
    }
}
