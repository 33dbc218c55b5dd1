//! Feedback relay core.
//!
//! Drains 3-byte feedback messages from a lock-free SPSC byte queue on a
//! dedicated worker and forwards the Control Change subset to an output sink.
//!
//! The transport itself lives behind [`OutputSink`]; see `midirelay-io` for
//! the hardware implementation.

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::RelayConfig;

mod message;
pub use message::{FeedbackMessage, MessageFamily, OutputEvent, FEEDBACK_MESSAGE_LEN};

pub mod queue;
pub use queue::{
    feedback_channel, feedback_channel_with_capacity, FeedbackConsumer, FeedbackProducer,
    FeedbackQueue, DEFAULT_QUEUE_CAPACITY,
};

mod wake;
pub use wake::{wake_channel, EventSource, WakeCode, WakeSource, Waker};

mod sink;
pub use sink::{OutputConnection, OutputSink};

mod metrics;
pub use metrics::{RelayMetrics, RelayMetricsSnapshot};

mod relay;
pub use relay::{
    FeedbackRelay, RelayHandle, RelayNotification, RelayState, StateView, StopHandle,
    EXIT_ABORTED, EXIT_SINK_FAILED, EXIT_STOPPED,
};

mod system;
pub use system::{FeedbackFeed, RelaySystem, RelaySystemBuilder};
