#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the rotary dial decoder.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty file yields the stock timing of a
//!   10 pulses-per-second dial on BCM pin 14 with a pull-down.
use serde::Deserialize;

/// Highest BCM GPIO number exposed on the 40-pin header.
pub const MAX_BCM_PIN: u8 = 27;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    /// Idle level low; the dial's make contact drives the line high.
    #[default]
    Down,
    Up,
    None,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Input {
    /// BCM number of the pulse input line
    pub pin: u8,
    pub pull: Pull,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            pin: 14,
            pull: Pull::Down,
        }
    }
}

/// Dial timing in milliseconds.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Timing {
    /// Nominal make (contact closed) phase
    pub make_ms: u64,
    /// Nominal break (contact open) phase
    pub break_ms: u64,
    /// Accepted deviation on either side of the nominal phases
    pub tolerance_ms: u64,
    /// Silence that finalizes the digit being dialed
    pub inter_digit_ms: u64,
    /// Silence that finalizes the whole number
    pub max_inter_digit_ms: u64,
}

impl Default for Timing {
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Poll {
    /// How often the consumer asks the decoder for a completed number
    pub interval_ms: u64,
}

impl Default for Poll {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// One entry of the dispatch table. Exactly one of `exact` / `prefix` is set.
///
/// ```toml
/// [[routes]]
/// exact = "8675309"
/// action = "jenny"
/// command = ["mpg123", "/srv/music/jenny.mp3"]
/// ```
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RouteCfg {
    pub exact: Option<String>,
    pub prefix: Option<String>,
    pub action: String,
    /// Program and arguments spawned when the route matches
    pub command: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub input: Input,
    pub timing: Timing,
    pub poll: Poll,
    pub logging: Logging,
    pub routes: Vec<RouteCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. A missing file yields the defaults.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => eyre::bail!("read config {:?}: {}", path, e),
    };
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    Ok(cfg)
}

fn is_digit_sequence(s: &str) -> bool {
    let mut any = false;
    for c in s.chars() {
        match c {
            '0'..='9' => any = true,
            '-' | ' ' => {}
            _ => return false,
        }
    }
    any
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Input
        if self.input.pin > MAX_BCM_PIN {
            eyre::bail!("input.pin must be <= {MAX_BCM_PIN}");
        }

        // Timing
        let t = &self.timing;
        if t.make_ms == 0 {
            eyre::bail!("timing.make_ms must be > 0");
        }
        if t.break_ms == 0 {
            eyre::bail!("timing.break_ms must be > 0");
        }
        if t.tolerance_ms >= t.make_ms || t.tolerance_ms >= t.break_ms {
            eyre::bail!("timing.tolerance_ms must be smaller than make_ms and break_ms");
        }
        if t.inter_digit_ms <= t.break_ms.saturating_add(t.tolerance_ms) {
            eyre::bail!("timing.inter_digit_ms must exceed break_ms + tolerance_ms");
        }
        if t.max_inter_digit_ms <= t.inter_digit_ms {
            eyre::bail!("timing.max_inter_digit_ms must exceed inter_digit_ms");
        }
        if t.max_inter_digit_ms > 60 * 1000 {
            eyre::bail!("timing.max_inter_digit_ms is unreasonably large (>60s)");
        }

        // Poll
        if self.poll.interval_ms == 0 {
            eyre::bail!("poll.interval_ms must be >= 1");
        }
        if self.poll.interval_ms >= t.inter_digit_ms {
            eyre::bail!("poll.interval_ms must be shorter than timing.inter_digit_ms");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of never, daily, hourly (got {rot:?})");
            }
        }

        // Routes
        for (i, r) in self.routes.iter().enumerate() {
            let digits = match (&r.exact, &r.prefix) {
                (Some(d), None) | (None, Some(d)) => d,
                _ => eyre::bail!("routes[{i}] must set exactly one of exact or prefix"),
            };
            if !is_digit_sequence(digits) {
                eyre::bail!("routes[{i}] digits must be 0-9 (got {digits:?})");
            }
            if r.action.trim().is_empty() {
                eyre::bail!("routes[{i}].action must not be empty");
            }
        }

        Ok(())
    }
}
