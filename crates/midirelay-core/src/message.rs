//! Feedback message framing and Control Change translation.
//!
//! A feedback message is always three bytes `[status, data1, data2]`. Only the
//! Control Change family is forwarded; every other family is still valid
//! framing but produces no output event.

use serde::{Deserialize, Serialize};

/// Size of one feedback message on the queue.
pub const FEEDBACK_MESSAGE_LEN: usize = 3;

const STATUS_FAMILY_MASK: u8 = 0xF0;
const STATUS_CHANNEL_MASK: u8 = 0x0F;

/// One 3-byte group read from the feedback queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl FeedbackMessage {
    #[inline]
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Control Change on `channel` (clamped to 0-15).
    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(0xB0 | channel.min(15), controller, value)
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; FEEDBACK_MESSAGE_LEN]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; FEEDBACK_MESSAGE_LEN] {
        [self.status, self.data1, self.data2]
    }

    #[inline]
    pub fn family(&self) -> MessageFamily {
        MessageFamily::from_status(self.status)
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.status & STATUS_CHANNEL_MASK
    }

    /// Translate into an output event, or `None` if the family is not forwarded.
    #[inline]
    pub fn translate(&self) -> Option<OutputEvent> {
        match self.family() {
            MessageFamily::ControlChange => Some(OutputEvent {
                channel: self.channel(),
                controller: self.data1,
                value: self.data2,
            }),
            _ => None,
        }
    }
}

impl From<[u8; FEEDBACK_MESSAGE_LEN]> for FeedbackMessage {
    fn from(bytes: [u8; FEEDBACK_MESSAGE_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Message family selected by the status high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFamily {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    System,
    /// High bit clear: a data byte where a status byte was expected.
    Data,
}

impl MessageFamily {
    pub fn from_status(status: u8) -> Self {
        match status & STATUS_FAMILY_MASK {
            0x80 => MessageFamily::NoteOff,
            0x90 => MessageFamily::NoteOn,
            0xA0 => MessageFamily::PolyPressure,
            0xB0 => MessageFamily::ControlChange,
            0xC0 => MessageFamily::ProgramChange,
            0xD0 => MessageFamily::ChannelPressure,
            0xE0 => MessageFamily::PitchBend,
            0xF0 => MessageFamily::System,
            _ => MessageFamily::Data,
        }
    }
}

/// Control Change ready for the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputEvent {
    /// 0-15
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

impl OutputEvent {
    pub fn new(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            channel: channel & STATUS_CHANNEL_MASK,
            controller,
            value,
        }
    }

    /// Wire bytes for a MIDI 1.0 transport. Data bytes are masked to 7 bits.
    #[inline]
    pub fn to_midi(&self) -> [u8; FEEDBACK_MESSAGE_LEN] {
        [
            0xB0 | (self.channel & STATUS_CHANNEL_MASK),
            self.controller & 0x7F,
            self.value & 0x7F,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_change_translates() {
        let msg = FeedbackMessage::new(0xB3, 74, 100);
        assert_eq!(msg.family(), MessageFamily::ControlChange);
        assert_eq!(
            msg.translate(),
            Some(OutputEvent {
                channel: 3,
                controller: 74,
                value: 100
            })
        );
    }

    #[test]
    fn test_every_cc_channel_translates() {
        for channel in 0..16u8 {
            let event = FeedbackMessage::new(0xB0 | channel, 1, 2).translate().unwrap();
            assert_eq!(event.channel, channel);
        }
    }

    #[test]
    fn test_other_families_dropped() {
        for status in [0x80, 0x90, 0xA5, 0xC0, 0xDF, 0xE2, 0xF8, 0x00, 0x7F] {
            let msg = FeedbackMessage::new(status, 60, 100);
            assert_ne!(msg.family(), MessageFamily::ControlChange);
            assert!(msg.translate().is_none(), "status {status:#04X} must not translate");
        }
    }

    #[test]
    fn test_data_bytes_forwarded_unchanged() {
        // Out-of-range data bytes are still valid framing
        let event = FeedbackMessage::new(0xB0, 0xFF, 0x80).translate().unwrap();
        assert_eq!(event.controller, 0xFF);
        assert_eq!(event.value, 0x80);
    }

    #[test]
    fn test_family_from_status() {
        assert_eq!(MessageFamily::from_status(0x90), MessageFamily::NoteOn);
        assert_eq!(MessageFamily::from_status(0x8F), MessageFamily::NoteOff);
        assert_eq!(MessageFamily::from_status(0xBF), MessageFamily::ControlChange);
        assert_eq!(MessageFamily::from_status(0xF0), MessageFamily::System);
        assert_eq!(MessageFamily::from_status(0x40), MessageFamily::Data);
    }

    #[test]
    fn test_control_change_constructor_clamps_channel() {
        let msg = FeedbackMessage::control_change(200, 7, 127);
        assert_eq!(msg.status, 0xBF);
        assert_eq!(msg.to_bytes(), [0xBF, 7, 127]);
    }

    #[test]
    fn test_output_event_wire_bytes() {
        assert_eq!(OutputEvent::new(0, 7, 64).to_midi(), [0xB0, 7, 64]);
        assert_eq!(OutputEvent::new(15, 64, 0).to_midi(), [0xBF, 64, 0]);

        let event = OutputEvent {
            channel: 1,
            controller: 0xFF,
            value: 0xFF,
        };
        assert_eq!(event.to_midi(), [0xB1, 0x7F, 0x7F]);
    }
}
