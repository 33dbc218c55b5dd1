//! Owner-side wiring: queue, wake channel, notifications and worker thread.
//!
//! ## Quick Start
//!
//! ```ignore
//! use midirelay_core::RelaySystem;
//!
//! let mut relay = RelaySystem::builder()
//!     .queue_capacity(3 * 256)
//!     .build(sink)?;
//!
//! relay.feed().send_cc(0, 7, 100);
//!
//! let status = relay.shutdown();
//! ```

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::message::FeedbackMessage;
use crate::metrics::RelayMetrics;
use crate::queue::{feedback_channel_with_capacity, FeedbackProducer};
use crate::relay::{
    FeedbackRelay, RelayHandle, RelayNotification, RelayState, StopHandle, EXIT_ABORTED,
    EXIT_SINK_FAILED, EXIT_STOPPED,
};
use crate::sink::OutputSink;
use crate::wake::{wake_channel, Waker};
use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;

/// Producer end of a running relay: writes feedback and wakes the worker.
#[derive(Debug)]
pub struct FeedbackFeed {
    producer: FeedbackProducer,
    waker: Waker,
}

impl FeedbackFeed {
    /// Returns `false` if the queue is full; nothing is written in that case.
    pub fn send(&mut self, message: FeedbackMessage) -> bool {
        let pushed = self.producer.push(message);
        if pushed {
            self.waker.wake();
        }
        pushed
    }

    pub fn send_cc(&mut self, channel: u8, controller: u8, value: u8) -> bool {
        self.send(FeedbackMessage::control_change(channel, controller, value))
    }

    /// Raw bytes, not necessarily whole groups. Returns the number written.
    pub fn send_bytes(&mut self, bytes: &[u8]) -> usize {
        let written = self.producer.push_bytes(bytes);
        if written > 0 {
            self.waker.wake();
        }
        written
    }

    pub fn waker(&self) -> Waker {
        self.waker.clone()
    }
}

pub struct RelaySystemBuilder {
    config: RelayConfig,
    metrics: Option<Arc<RelayMetrics>>,
}

impl Default for RelaySystemBuilder {
    fn default() -> Self {
        Self {
            config: RelayConfig::default(),
            metrics: None,
        }
    }
}

impl RelaySystemBuilder {
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Queue size in bytes.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = name.into();
        self
    }

    /// Share counters with an existing collector.
    pub fn metrics(mut self, metrics: Arc<RelayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Spawns the worker. A sink that fails to open is reported through
    /// [`RelaySystem::notifications`] and [`RelaySystem::shutdown`].
    pub fn build<S>(self, sink: S) -> Result<RelaySystem>
    where
        S: OutputSink + Send + 'static,
        S::Connection: Send,
    {
        self.config.validate()?;

        let (producer, consumer) = feedback_channel_with_capacity(self.config.queue_capacity);
        let (waker, source) = wake_channel();
        let (notify_tx, notifications) = bounded(1);
        let metrics = self.metrics.unwrap_or_default();

        let relay = FeedbackRelay::new(sink, consumer, source)
            .with_waker(waker.clone())
            .with_notifier(notify_tx)
            .with_metrics(Arc::clone(&metrics));
        let handle = relay.spawn(&self.config.thread_name)?;

        tracing::debug!(
            "Spawned relay worker '{}' ({} byte queue)",
            self.config.thread_name,
            self.config.queue_capacity
        );

        Ok(RelaySystem {
            feed: FeedbackFeed { producer, waker },
            handle,
            notifications,
            metrics,
            config: self.config,
        })
    }
}

/// A running relay and everything its owner needs to drive it.
pub struct RelaySystem {
    feed: FeedbackFeed,
    handle: RelayHandle,
    notifications: Receiver<RelayNotification>,
    metrics: Arc<RelayMetrics>,
    config: RelayConfig,
}

impl RelaySystem {
    pub fn builder() -> RelaySystemBuilder {
        RelaySystemBuilder::default()
    }

    pub fn feed(&mut self) -> &mut FeedbackFeed {
        &mut self.feed
    }

    pub fn notifications(&self) -> &Receiver<RelayNotification> {
        &self.notifications
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn state(&self) -> RelayState {
        self.handle.state()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.handle.stop_handle()
    }

    /// Stops the worker, waits for it, and returns its exit status.
    ///
    /// The status comes from the pending [`RelayNotification::Exit`]. If the
    /// owner already took that notification, it is derived from how the
    /// worker ended instead.
    pub fn shutdown(self) -> i32 {
        self.handle.stop();
        let joined = self.handle.join();

        if let Ok(RelayNotification::Exit { status }) = self.notifications.try_recv() {
            return status;
        }
        match joined {
            Ok(()) => EXIT_STOPPED,
            Err(Error::WorkerPanicked) => EXIT_ABORTED,
            Err(e) => {
                tracing::debug!("Relay worker ended with: {}", e);
                EXIT_SINK_FAILED
            }
        }
    }
}

impl std::fmt::Debug for RelaySystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySystem")
            .field("state", &self.handle.state())
            .field("config", &self.config)
            .finish()
    }
}
