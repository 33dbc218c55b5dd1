//! Wake notifications that pace queue polling.
//!
//! The relay blocks in [`EventSource::wait`] and re-checks the feedback queue
//! whenever it returns. Apart from [`WakeCode::SHUTDOWN`] the code carries no
//! meaning for the relay.
//!
//! The channel holds a single pending wake. Further wakes coalesce into it,
//! since one drain pass picks up everything queued before it starts. A
//! coalesced [`WakeCode::SHUTDOWN`] is still honored through the stop flag.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Opaque code returned by a wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeCode(pub u32);

impl WakeCode {
    /// "Something happened, re-check the queue."
    pub const FEEDBACK: WakeCode = WakeCode(0);
    /// Reserved for shutdown. Also returned once every [`Waker`] is gone.
    pub const SHUTDOWN: WakeCode = WakeCode(u32::MAX);

    #[inline]
    pub fn is_shutdown(self) -> bool {
        self == Self::SHUTDOWN
    }
}

/// Blocking wait primitive. This is the relay's only suspension point.
pub trait EventSource {
    fn wait(&mut self) -> WakeCode;
}

/// Sender half of the wake channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Waker {
    sender: Sender<WakeCode>,
}

impl Waker {
    #[inline]
    pub fn wake(&self) -> bool {
        self.wake_with(WakeCode::FEEDBACK)
    }

    /// Returns `false` if the relay side is gone. A wake already pending
    /// absorbs this one.
    pub fn wake_with(&self, code: WakeCode) -> bool {
        match self.sender.try_send(code) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("Wake dropped: relay event source closed");
                false
            }
        }
    }
}

/// Receiver half, consumed by the relay.
#[derive(Debug)]
pub struct WakeSource {
    receiver: Receiver<WakeCode>,
}

impl EventSource for WakeSource {
    fn wait(&mut self) -> WakeCode {
        self.receiver.recv().unwrap_or(WakeCode::SHUTDOWN)
    }
}

pub fn wake_channel() -> (Waker, WakeSource) {
    let (sender, receiver) = bounded(1);
    (Waker { sender }, WakeSource { receiver })
}
