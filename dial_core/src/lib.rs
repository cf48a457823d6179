#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Rotary dial pulse decoding (hardware-agnostic).
//!
//! Edges come in through `dial_traits::PulseInput`; this crate turns them into
//! dialed numbers.
//!
//! ## Architecture
//!
//! - **Classifier**: make/break timing windows and the pulse counter (`decoder`)
//! - **Timers**: inter-digit and max-inter-digit deadlines (`timers`)
//! - **Assembler**: decoder + timers as one owned capsule (`dial`)
//! - **Service**: the capsule on a worker thread fed by one channel (`service`)
//! - **Dispatch**: number → action lookup for consumers (`dispatch`)
//!
//! ## Timebase
//!
//! Everything runs on `u64` milliseconds from one monotonic epoch. The decoder
//! itself never reads a clock, so tests drive it with virtual time.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod decoder;
pub mod dial;
pub mod digits;
pub mod dispatch;
pub mod error;
pub mod service;
pub mod timers;
pub mod train;

pub use builder::DialServiceBuilder;
pub use config::DialTiming;
pub use decoder::{DecoderState, DialSnapshot, EdgeOutcome, PulseDecoder};
pub use dial::Dial;
pub use digits::{DialedNumber, Digit};
pub use dispatch::{Dispatcher, Pattern, RouteAction};
pub use error::{BuildError, DialError};
pub use service::{DialService, EdgeSender};
pub use timers::{CompletionTimers, TimerKind};
