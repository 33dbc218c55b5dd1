//! # Feedback relay
//!
//! Publishes a virtual "Out" port (or connects to a named device) and relays a
//! short sweep of Control Change feedback through it.
//!
//! **Concepts:** RelaySystem builder, feedback feed, exit notification
//!
//! ```bash
//! cargo run --example feedback_relay
//! cargo run --example feedback_relay -- "IAC Driver"
//! ```

use midirelay::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = RelayConfig {
        client_name: "midirelay-demo".to_string(),
        ..Default::default()
    };

    let mut sink = MidirOutputSink::from_config(&config);
    if let Some(device) = std::env::args().nth(1) {
        sink = sink.target(PortTarget::Name(device));
    }

    println!("MIDI output devices:");
    for dev in midirelay::list_devices(&config.client_name) {
        println!("  [{}] {}", dev.index, dev.name);
    }

    let mut relay = RelaySystem::builder().config(config).build(sink)?;

    // Failed sink acquisition is fatal: the worker reports it and stops
    if let Ok(RelayNotification::Exit { status }) = relay
        .notifications()
        .recv_timeout(Duration::from_millis(250))
    {
        eprintln!("Error opening MIDI output, relay exited with status {status}");
        std::process::exit(status);
    }

    println!("Sweeping CC 7 on channel 1...");
    for value in (0..=127u8).step_by(8) {
        relay.feed().send_cc(0, 7, value);
        // Note On is valid framing but never forwarded
        relay.feed().send(FeedbackMessage::new(0x90, 60, value));
        std::thread::sleep(Duration::from_millis(50));
    }

    let metrics = relay.metrics();
    let status = relay.shutdown();
    let metrics = metrics.snapshot();
    println!(
        "Relayed {} of {} messages ({} dropped), exit status {}",
        metrics.sent, metrics.received, metrics.dropped, status
    );

    Ok(())
}
