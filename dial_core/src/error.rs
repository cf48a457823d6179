use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DialError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid digit sequence: {0:?}")]
    InvalidNumber(String),
    #[error("pulse input error: {0}")]
    Input(String),
    #[error("decoder worker is not running")]
    Disconnected,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid timing: {0}")]
    InvalidTiming(&'static str),
    #[error("edge queue depth must be >= 1")]
    ZeroQueueDepth,
    #[error("failed to spawn decoder thread: {0}")]
    Spawn(String),
}
