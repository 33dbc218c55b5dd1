//! Error types for the MIDI output transport.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI send error: {0}")]
    MidiSend(String),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::MidiSend(e.to_string())
    }
}

/// Open failures are fatal to the relay; send failures are not.
impl From<Error> for midirelay_core::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::MidiSend(msg) => midirelay_core::Error::SinkEmit(msg),
            other => midirelay_core::Error::SinkOpen(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
