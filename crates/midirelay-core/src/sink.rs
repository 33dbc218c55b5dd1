//! Output sink capability.
//!
//! The relay opens the sink once, emits through the returned connection, and
//! closes it by value, so a connection can never be closed twice.

use crate::error::Result;
use crate::message::OutputEvent;

/// Acquires the live output transport.
pub trait OutputSink {
    type Connection: OutputConnection;

    fn open(&mut self) -> Result<Self::Connection>;
}

/// An open output transport.
pub trait OutputConnection {
    /// Send one event synchronously, in call order.
    fn emit(&mut self, event: &OutputEvent) -> Result<()>;

    fn close(self);
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    type Connection = S::Connection;

    fn open(&mut self) -> Result<Self::Connection> {
        (**self).open()
    }
}
