//! Error types for the feedback relay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to open output sink: {0}")]
    SinkOpen(String),

    #[error("Failed to emit output event: {0}")]
    SinkEmit(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn relay worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Relay worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
