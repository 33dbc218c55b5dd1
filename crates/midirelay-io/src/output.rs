//! MIDI output sink backed by midir.
//!
//! On Unix the default target is a virtual, subscribable output port named
//! after [`RelayConfig::port_name`], so other clients connect to the relay.
//! Elsewhere (or on request) the sink connects to an existing device.

#![cfg_attr(not(feature = "midi-io"), allow(unused_imports, dead_code))]

use crate::error::{Error, Result};
#[cfg(feature = "midi-io")]
use midir::{MidiOutput, MidiOutputConnection};
use midirelay_core::{OutputConnection, OutputEvent, OutputSink, RelayConfig};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

/// Where the relay's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortTarget {
    /// New port other clients can subscribe to. Unix only.
    Virtual,
    /// Existing device by enumeration index.
    Index(usize),
    /// First existing device whose name contains this (case-insensitive).
    Name(String),
}

impl Default for PortTarget {
    fn default() -> Self {
        if cfg!(unix) {
            PortTarget::Virtual
        } else {
            PortTarget::Index(0)
        }
    }
}

/// Case-insensitive partial match, first hit wins.
pub(crate) fn find_port_index<S: AsRef<str>>(names: &[S], pattern: &str) -> Option<usize> {
    let pattern = pattern.to_lowercase();
    names
        .iter()
        .position(|name| name.as_ref().to_lowercase().contains(&pattern))
}

#[derive(Debug, Clone)]
pub struct MidirOutputSink {
    client_name: String,
    port_name: String,
    target: PortTarget,
}

impl MidirOutputSink {
    pub fn new(client_name: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            port_name: port_name.into(),
            target: PortTarget::default(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.client_name.clone(), config.port_name.clone())
    }

    pub fn target(mut self, target: PortTarget) -> Self {
        self.target = target;
        self
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn port_target(&self) -> &PortTarget {
        &self.target
    }
}

#[cfg(feature = "midi-io")]
impl MidirOutputSink {
    fn connect(&self) -> Result<(MidiOutputConnection, String)> {
        let midi_output = MidiOutput::new(&self.client_name)?;

        let index = match self.target {
            PortTarget::Virtual => return self.create_virtual(midi_output),
            PortTarget::Index(index) => index,
            PortTarget::Name(ref pattern) => {
                let names: Vec<String> = midi_output
                    .ports()
                    .iter()
                    .map(|port| midi_output.port_name(port).unwrap_or_default())
                    .collect();
                find_port_index(&names, pattern).ok_or_else(|| {
                    Error::MidiDevice(format!(
                        "No MIDI output device found matching '{}'",
                        pattern
                    ))
                })?
            }
        };

        let ports = midi_output.ports();
        let port = ports.get(index).ok_or_else(|| {
            Error::MidiDevice(format!("MIDI output device {} not found", index))
        })?;
        let device_name = midi_output
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", index));

        let connection = midi_output.connect(port, &self.port_name)?;
        Ok((connection, device_name))
    }

    #[cfg(unix)]
    fn create_virtual(&self, midi_output: MidiOutput) -> Result<(MidiOutputConnection, String)> {
        use midir::os::unix::VirtualOutput;

        let connection = midi_output.create_virtual(&self.port_name)?;
        Ok((connection, format!("{}:{}", self.client_name, self.port_name)))
    }

    #[cfg(not(unix))]
    fn create_virtual(&self, _midi_output: MidiOutput) -> Result<(MidiOutputConnection, String)> {
        Err(Error::MidiPort(
            "virtual output ports are not supported on this platform".to_string(),
        ))
    }
}

#[cfg(feature = "midi-io")]
impl OutputSink for MidirOutputSink {
    type Connection = MidirConnection;

    fn open(&mut self) -> midirelay_core::Result<MidirConnection> {
        let (connection, name) = self.connect()?;
        info!("Opened MIDI output '{}'", name);
        Ok(MidirConnection {
            connection,
            name,
            buffer: [0; 3],
        })
    }
}

/// Live midir connection. Sends are direct, one CC per call.
#[cfg(feature = "midi-io")]
pub struct MidirConnection {
    connection: MidiOutputConnection,
    name: String,
    buffer: [u8; 3],
}

#[cfg(feature = "midi-io")]
impl MidirConnection {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(feature = "midi-io")]
impl OutputConnection for MidirConnection {
    fn emit(&mut self, event: &OutputEvent) -> midirelay_core::Result<()> {
        self.buffer = event.to_midi();
        self.connection
            .send(&self.buffer)
            .map_err(|e| Error::from(e).into())
    }

    fn close(self) {
        debug!("Closing MIDI output '{}'", self.name);
        let _ = self.connection.close();
    }
}

#[cfg(feature = "midi-io")]
pub fn list_devices(client_name: &str) -> Vec<MidiOutputDevice> {
    let mut devices = Vec::new();
    if let Ok(midi_output) = MidiOutput::new(client_name) {
        for (index, port) in midi_output.ports().iter().enumerate() {
            let name = midi_output
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            devices.push(MidiOutputDevice { index, name });
        }
    }
    devices
}
