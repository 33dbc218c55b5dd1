//! Umbrella-level tests: the public surface wires together end to end.

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};
use midirelay::prelude::*;
use midirelay::{
    EventSource, FeedbackRelay, OutputConnection, OutputSink, WakeCode, EXIT_SINK_FAILED,
};

struct Forward(Sender<OutputEvent>);
struct ForwardConnection(Sender<OutputEvent>);

impl OutputSink for Forward {
    type Connection = ForwardConnection;

    fn open(&mut self) -> midirelay::Result<ForwardConnection> {
        Ok(ForwardConnection(self.0.clone()))
    }
}

impl OutputConnection for ForwardConnection {
    fn emit(&mut self, event: &OutputEvent) -> midirelay::Result<()> {
        let _ = self.0.send(*event);
        Ok(())
    }

    fn close(self) {}
}

struct Unavailable;

impl OutputSink for Unavailable {
    type Connection = ForwardConnection;

    fn open(&mut self) -> midirelay::Result<ForwardConnection> {
        Err(midirelay::Error::SinkOpen("sequencer unavailable".to_string()))
    }
}

/// One wake, then shutdown.
struct Once(bool);

impl EventSource for Once {
    fn wait(&mut self) -> WakeCode {
        if std::mem::replace(&mut self.0, false) {
            WakeCode::FEEDBACK
        } else {
            WakeCode::SHUTDOWN
        }
    }
}

#[test]
fn test_inline_relay_over_vecdeque() {
    let (tx, rx) = unbounded();
    let queue: VecDeque<u8> = [0xB0, 0x07, 0x40, 0x90, 0x3C, 0x7F, 0xB1, 0x0A, 0x10]
        .into_iter()
        .collect();

    FeedbackRelay::new(Forward(tx), queue, Once(true))
        .run()
        .unwrap();

    let events: Vec<OutputEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![OutputEvent::new(0, 7, 0x40), OutputEvent::new(1, 10, 16)]
    );
}

#[test]
fn test_system_relays_and_reports_exit() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let (tx, rx) = unbounded();
    let mut relay = RelaySystem::builder()
        .config(RelayConfig {
            queue_capacity: 3 * 8,
            ..Default::default()
        })
        .build(Forward(tx))
        .unwrap();

    assert!(relay.feed().send_cc(9, 64, 127));
    assert!(relay.feed().send(FeedbackMessage::new(0xE0, 0, 64)));
    assert!(relay.feed().send_cc(9, 64, 0));

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)),
        Ok(OutputEvent::new(9, 64, 127))
    );
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)),
        Ok(OutputEvent::new(9, 64, 0))
    );

    assert_eq!(relay.shutdown(), EXIT_STOPPED);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_unavailable_sink_exit_status() {
    let relay = RelaySystem::builder().build(Unavailable).unwrap();
    assert_eq!(
        relay.notifications().recv_timeout(Duration::from_secs(5)),
        Ok(RelayNotification::Exit {
            status: EXIT_SINK_FAILED
        })
    );
    assert_eq!(relay.state(), RelayState::Terminated);
}
