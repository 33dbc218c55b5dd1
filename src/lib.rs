//! # midirelay - Feedback relay
//!
//! Forwards feedback produced inside an application (synthesis engine, UI,
//! automation) to an external MIDI output, on a dedicated worker thread.
//!
//! ## Architecture
//!
//! midirelay is an umbrella crate that coordinates:
//! - **midirelay-core** - SPSC feedback queue, wake channel, relay lifecycle, metrics
//! - **midirelay-io** - midir output sink (virtual port or existing device)
//!
//! ## Quick Start
//!
//! ```ignore
//! use midirelay::prelude::*;
//!
//! let config = RelayConfig::default();
//! let mut relay = RelaySystem::builder()
//!     .config(config.clone())
//!     .build(MidirOutputSink::from_config(&config))?;
//!
//! // Producer side: whole 3-byte groups, Control Change is forwarded
//! relay.feed().send_cc(0, 7, 100);
//!
//! let status = relay.shutdown();
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Core relay plus hardware output
//! - `midi-io` - midir output sink

/// Re-export of midirelay-core for direct access
pub use midirelay_core as core;

pub use midirelay_core::{
    feedback_channel,
    feedback_channel_with_capacity,
    wake_channel,
    // Error
    Error,
    EventSource,
    FeedbackFeed,
    // Queue
    FeedbackConsumer,
    FeedbackMessage,
    FeedbackProducer,
    FeedbackQueue,
    // Relay
    FeedbackRelay,
    MessageFamily,
    OutputConnection,
    OutputEvent,
    // Sink
    OutputSink,
    RelayConfig,
    RelayHandle,
    RelayMetrics,
    RelayMetricsSnapshot,
    RelayNotification,
    RelayState,
    RelaySystem,
    RelaySystemBuilder,
    Result,
    StopHandle,
    WakeCode,
    Waker,
    EXIT_ABORTED,
    EXIT_SINK_FAILED,
    EXIT_STOPPED,
};

// Hardware output
#[cfg(feature = "midi-io")]
pub use midirelay_io as io;
#[cfg(feature = "midi-io")]
pub use midirelay_io::{list_devices, MidiOutputDevice, MidirOutputSink, PortTarget};

pub mod prelude {
    pub use crate::{
        FeedbackMessage, OutputEvent, RelayConfig, RelayNotification, RelayState, RelaySystem,
        Result, EXIT_STOPPED,
    };

    #[cfg(feature = "midi-io")]
    pub use crate::{MidirOutputSink, PortTarget};
}
