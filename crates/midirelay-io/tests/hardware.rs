//! Hardware integration tests against a real MIDI sequencer.
//!
//! Needs a running ALSA/CoreMIDI/JACK backend that supports virtual ports.
//! All tests are `#[ignore]` so CI doesn't fail without one.
//!
//! Run with:
//!   cargo test -p midirelay-io --test hardware -- --ignored --test-threads=1

#![cfg(all(feature = "midi-io", unix))]

use std::thread;
use std::time::Duration;

use midir::{Ignore, MidiInput};
use midirelay_core::{RelaySystem, EXIT_STOPPED};
use midirelay_io::{list_devices, MidirOutputSink, PortTarget};

const PORT_SETTLE: Duration = Duration::from_millis(200);

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Spawn a relay on a virtual port and subscribe to it with a midir input.
#[test]
#[ignore]
fn test_virtual_port_loopback() {
    init_tracing();

    let sink = MidirOutputSink::new("midirelay-loopback", "Out").target(PortTarget::Virtual);
    let mut relay = RelaySystem::builder()
        .thread_name("relay-hw-loopback")
        .build(sink)
        .expect("Failed to spawn relay");
    thread::sleep(PORT_SETTLE);

    let mut midi_in = MidiInput::new("midirelay-loopback-in").unwrap();
    midi_in.ignore(Ignore::None);
    let ports = midi_in.ports();
    let port = ports
        .iter()
        .find(|p| {
            midi_in
                .port_name(p)
                .map(|n| n.contains("midirelay-loopback"))
                .unwrap_or(false)
        })
        .expect("Virtual relay port not visible")
        .clone();

    let (tx, rx) = crossbeam_channel::unbounded();
    let _conn = midi_in
        .connect(
            &port,
            "loopback",
            move |_stamp, bytes, _| {
                let _ = tx.send(bytes.to_vec());
            },
            (),
        )
        .unwrap();
    thread::sleep(PORT_SETTLE);

    relay.feed().send_bytes(&[0xB0, 0x07, 0x40, 0x90, 0x3C, 0x7F, 0xB1, 0x0A, 0x10]);

    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first, vec![0xB0, 0x07, 0x40]);
    assert_eq!(second, vec![0xB1, 0x0A, 0x10]);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

    assert_eq!(relay.shutdown(), EXIT_STOPPED);
}

#[test]
#[ignore]
fn test_missing_device_is_fatal() {
    let sink = MidirOutputSink::new("midirelay-missing", "Out")
        .target(PortTarget::Name("no such device anywhere".to_string()));
    let relay = RelaySystem::builder().build(sink).unwrap();
    assert_eq!(relay.shutdown(), midirelay_core::EXIT_SINK_FAILED);
}

#[test]
#[ignore]
fn test_list_devices_includes_virtual_port() {
    let sink = MidirOutputSink::new("midirelay-listed", "Out");
    let relay = RelaySystem::builder().build(sink).unwrap();
    thread::sleep(PORT_SETTLE);

    // Virtual outputs show up as inputs to other clients, not as outputs
    let devices = list_devices("midirelay-list-test");
    assert!(devices.iter().all(|d| !d.name.is_empty()));

    relay.shutdown();
}
