//! Feedback relay worker: lifecycle state machine and queue draining.
//!
//! ```text
//! Uninitialized -> Open -> Running -> Closing -> Terminated
//!       |                                            ^
//!       +---------- sink open failed ----------------+
//! ```
//!
//! A sink that cannot be opened skips `Open`, `Running` and `Closing`
//! entirely: the relay goes straight to `Terminated` so observers of
//! [`StateView`] see a final state, and no other transition follows.
//!
//! `Running` loops on `wait()` followed by a full drain pass. The loop ends on
//! a stop request (flag or [`WakeCode::SHUTDOWN`]), checked before every wait
//! and again right after it returns. A drain pass in progress always finishes.

use crate::error::{Error, Result};
use crate::message::{OutputEvent, FEEDBACK_MESSAGE_LEN};
use crate::metrics::RelayMetrics;
use crate::queue::FeedbackQueue;
use crate::sink::{OutputConnection, OutputSink};
use crate::wake::{EventSource, WakeCode, Waker};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

/// Requested stop.
pub const EXIT_STOPPED: i32 = 0;
/// Output sink could not be acquired.
pub const EXIT_SINK_FAILED: i32 = 1;
/// Worker unwound before reaching `Terminated`.
pub const EXIT_ABORTED: i32 = 2;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelayState {
    Uninitialized = 0,
    Open = 1,
    Running = 2,
    Closing = 3,
    Terminated = 4,
}

impl RelayState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RelayState::Uninitialized,
            1 => RelayState::Open,
            2 => RelayState::Running,
            3 => RelayState::Closing,
            _ => RelayState::Terminated,
        }
    }
}

/// Sent to the owner exactly once, after the sink is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayNotification {
    Exit { status: i32 },
}

/// Thread-safe stop request. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
    waker: Option<Waker>,
}

impl StopHandle {
    /// Without a waker the relay notices the request on its next wake.
    pub fn request_stop(&self) {
        // SeqCst pairs with the relay's re-check after a coalesced wake
        self.requested.store(true, Ordering::SeqCst);
        if let Some(ref waker) = self.waker {
            waker.wake_with(WakeCode::SHUTDOWN);
        }
    }

    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Read-only view of the worker's state.
#[derive(Debug, Clone)]
pub struct StateView {
    state: Arc<AtomicU8>,
}

impl StateView {
    #[inline]
    pub fn get(&self) -> RelayState {
        RelayState::from_u8(self.state.load(Ordering::Acquire))
    }
}

pub struct FeedbackRelay<S: OutputSink, Q, E> {
    sink: S,
    connection: Option<S::Connection>,
    queue: Q,
    events: E,
    state: RelayState,
    published_state: Arc<AtomicU8>,
    stop_requested: Arc<AtomicBool>,
    waker: Option<Waker>,
    notifier: Option<Sender<RelayNotification>>,
    started: bool,
    notified: bool,
    metrics: Arc<RelayMetrics>,
}

impl<S, Q, E> FeedbackRelay<S, Q, E>
where
    S: OutputSink,
    Q: FeedbackQueue,
    E: EventSource,
{
    pub fn new(sink: S, queue: Q, events: E) -> Self {
        Self {
            sink,
            connection: None,
            queue,
            events,
            state: RelayState::Uninitialized,
            published_state: Arc::new(AtomicU8::new(RelayState::Uninitialized as u8)),
            stop_requested: Arc::new(AtomicBool::new(false)),
            waker: None,
            notifier: None,
            started: false,
            notified: false,
            metrics: Arc::new(RelayMetrics::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Sender<RelayNotification>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RelayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Lets stop handles interrupt a blocked `wait()`.
    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            requested: Arc::clone(&self.stop_requested),
            waker: self.waker.clone(),
        }
    }

    pub fn state_view(&self) -> StateView {
        StateView {
            state: Arc::clone(&self.published_state),
        }
    }

    #[inline]
    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Runs the whole lifecycle on the calling thread.
    ///
    /// Returns `Ok` after a requested stop, or the sink error if the output
    /// could not be opened. Either way exactly one
    /// [`RelayNotification::Exit`] has been sent when this returns.
    pub fn run(mut self) -> Result<()> {
        self.started = true;
        if let Err(e) = self.open_sink() {
            error!("Error opening output sink: {}", e);
            self.terminate(EXIT_SINK_FAILED);
            return Err(e);
        }

        self.advance(RelayState::Running);
        self.process_queue();

        self.advance(RelayState::Closing);
        self.terminate(EXIT_STOPPED);
        Ok(())
    }

    fn open_sink(&mut self) -> Result<()> {
        let connection = self.sink.open()?;
        self.connection = Some(connection);
        self.advance(RelayState::Open);
        info!("Opened output sink");
        Ok(())
    }

    fn process_queue(&mut self) {
        debug!("Waiting for feedback queue");
        loop {
            if self.is_stop_requested() {
                break;
            }

            let code = self.events.wait();
            self.metrics.record_wake();
            trace!("Got wake {}", code.0);

            if code.is_shutdown() {
                self.stop_requested.store(true, Ordering::SeqCst);
                break;
            }
            if self.is_stop_requested() {
                break;
            }

            let sent = self.drain();
            trace!("Drain pass emitted {} events", sent);
        }
    }

    /// Emits every complete group currently queued. Never waits for more bytes.
    fn drain(&mut self) -> usize {
        self.metrics.record_drain_pass();
        let mut sent = 0;

        while let Some(message) = self.queue.peek_message() {
            // Consumed unconditionally so framing never desyncs
            self.queue.commit(FEEDBACK_MESSAGE_LEN);
            self.metrics.record_received();
            trace!(
                "Received from feedback queue {:02X} {:02X} {:02X}",
                message.status,
                message.data1,
                message.data2
            );

            match message.translate() {
                Some(event) => {
                    if self.emit(&event) {
                        sent += 1;
                    }
                }
                None => {
                    self.metrics.record_dropped();
                    debug!("Unexpected status byte {:02X}", message.status);
                }
            }
        }

        sent
    }

    fn emit(&mut self, event: &OutputEvent) -> bool {
        let Some(connection) = self.connection.as_mut() else {
            return false;
        };

        match connection.emit(event) {
            Ok(()) => {
                self.metrics.record_sent();
                trace!(
                    "Sent CC {} = {} on channel {}",
                    event.controller,
                    event.value,
                    event.channel
                );
                true
            }
            Err(e) => {
                self.metrics.record_emit_failure();
                warn!("Dropped feedback event: {}", e);
                false
            }
        }
    }

    #[inline]
    fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

impl<S: OutputSink, Q, E> FeedbackRelay<S, Q, E> {
    fn advance(&mut self, next: RelayState) {
        debug_assert!(
            next > self.state,
            "relay state must move forward ({:?} -> {:?})",
            self.state,
            next
        );
        self.state = next;
        self.published_state.store(next as u8, Ordering::Release);
        debug!("Relay state -> {:?}", next);
    }

    /// Release the sink, then notify. Idempotent.
    fn terminate(&mut self, status: i32) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            info!("Closed output sink");
        }

        if self.state < RelayState::Terminated {
            self.advance(RelayState::Terminated);
        }

        if self.notified {
            return;
        }
        self.notified = true;

        if let Some(ref notifier) = self.notifier {
            if notifier.send(RelayNotification::Exit { status }).is_err() {
                debug!("Relay owner gone, exit notification dropped");
            }
        }
    }
}

impl<S: OutputSink, Q, E> Drop for FeedbackRelay<S, Q, E> {
    fn drop(&mut self) {
        // Only reached mid-lifecycle when the worker unwinds, sink open included
        if self.started && !self.notified {
            self.terminate(EXIT_ABORTED);
        }
    }
}

impl<S, Q, E> FeedbackRelay<S, Q, E>
where
    S: OutputSink + Send + 'static,
    S::Connection: Send,
    Q: FeedbackQueue + Send + 'static,
    E: EventSource + Send + 'static,
{
    /// Runs the lifecycle on a dedicated named thread.
    pub fn spawn(self, thread_name: &str) -> Result<RelayHandle> {
        let stop = self.stop_handle();
        let state = self.state_view();

        let join = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || self.run())?;

        Ok(RelayHandle {
            stop,
            state,
            join: Some(join),
        })
    }
}

/// Owner side of a spawned relay. Dropping it requests a stop.
pub struct RelayHandle {
    stop: StopHandle,
    state: StateView,
    join: Option<JoinHandle<Result<()>>>,
}

impl RelayHandle {
    pub fn stop(&self) {
        self.stop.request_stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> RelayState {
        self.state.get()
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map(|j| j.is_finished()).unwrap_or(true)
    }

    /// Waits for the worker and returns its result.
    pub fn join(mut self) -> Result<()> {
        match self.join.take() {
            Some(join) => join.join().map_err(|_| Error::WorkerPanicked)?,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RelayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayHandle")
            .field("state", &self.state.get())
            .field("stop_requested", &self.stop.is_stop_requested())
            .finish()
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.stop.request_stop();
        }
    }
}
