//! Relay configuration.

use crate::message::FEEDBACK_MESSAGE_LEN;
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Client name announced to the MIDI transport.
    pub client_name: String,
    /// Name of the readable output port.
    pub port_name: String,
    /// Feedback queue size in bytes.
    pub queue_capacity: usize,
    pub thread_name: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            client_name: "midirelay".to_string(),
            port_name: "Out".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name: "feedback-relay".to_string(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity < FEEDBACK_MESSAGE_LEN {
            return Err(Error::InvalidConfig(format!(
                "queue_capacity {} cannot hold a single {}-byte message",
                self.queue_capacity, FEEDBACK_MESSAGE_LEN
            )));
        }
        if self.client_name.trim().is_empty() {
            return Err(Error::InvalidConfig("client_name is empty".to_string()));
        }
        if self.port_name.trim().is_empty() {
            return Err(Error::InvalidConfig("port_name is empty".to_string()));
        }
        Ok(())
    }
}
