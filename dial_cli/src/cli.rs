//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "dial", version, about = "Rotary dial pulse decoder")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/dial_config.toml")]
    pub config: PathBuf,

    /// Print results and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Memory locking mode for real-time operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RtLock {
    /// Do not lock memory
    None,
    /// Lock currently resident pages
    Current,
    /// Lock current and future pages
    All,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode numbers from the pulse input and dispatch them to routes
    Listen {
        /// Replay this number through a simulated dial instead of GPIO
        #[arg(long, value_name = "NUMBER")]
        simulate: Option<String>,
        /// Exit after the first number
        #[arg(long, action = ArgAction::SetTrue)]
        once: bool,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority and locks the process address space into RAM so the decoder thread is not delayed by page faults. Edge timestamps are taken when the interrupt is delivered, so scheduling jitter shows up directly as phase error. Requires CAP_SYS_NICE/CAP_IPC_LOCK or root; failures are logged and the listener continues."
        )]
        rt: bool,
        /// SCHED_FIFO priority for --rt (1..=99)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
        /// Memory locking mode for --rt: none, current, or all
        #[arg(long, value_enum, value_name = "MODE", default_value = "current")]
        rt_lock: RtLock,
    },
    /// Dial a number through the decoder and print what it decodes to
    Simulate {
        /// Digits to dial, optionally separated by '-' or spaces
        #[arg(long, value_name = "NUMBER")]
        number: String,
        /// Silence between digits; defaults to midway between the two timeouts
        #[arg(long, value_name = "MS")]
        gap_ms: Option<u64>,
        /// Replay in real time through the background service instead of virtual time
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
    },
    /// Validate config, exercise the decoder, and probe the input line
    SelfCheck,
}
