//! MIDI output transport for the feedback relay.
//!
//! Implements [`midirelay_core::OutputSink`] on top of midir: either a virtual
//! output port other clients subscribe to, or a connection to an existing
//! device. Feature gate: `midi-io`.

pub mod error;
pub use error::{Error, Result};

mod output;
pub use output::{MidiOutputDevice, MidirOutputSink, PortTarget};

#[cfg(feature = "midi-io")]
pub use output::{list_devices, MidirConnection};
