//! Lock-free SPSC byte queue carrying feedback messages.
//!
//! - Producer: synthesis engine / UI feedback (any single thread)
//! - Consumer: the relay worker
//!
//! The consumer side only sees bytes. Framing into 3-byte groups is the
//! relay's job, so a queue holding a trailing partial group is legal.

use crate::message::{FeedbackMessage, FEEDBACK_MESSAGE_LEN};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::collections::VecDeque;

/// Room for 1024 messages.
pub const DEFAULT_QUEUE_CAPACITY: usize = FEEDBACK_MESSAGE_LEN * 1024;

/// Consumer-facing contract of the feedback queue.
pub trait FeedbackQueue {
    /// Bytes currently readable.
    fn read_avail(&self) -> usize;

    /// Byte at `offset` from the read position, without removing it.
    fn peek(&self, offset: usize) -> Option<u8>;

    /// Discard `count` bytes from the read position.
    fn commit(&mut self, count: usize);

    /// Next complete group, without removing it.
    fn peek_message(&self) -> Option<FeedbackMessage> {
        if self.read_avail() < FEEDBACK_MESSAGE_LEN {
            return None;
        }
        Some(FeedbackMessage::new(
            self.peek(0)?,
            self.peek(1)?,
            self.peek(2)?,
        ))
    }
}

/// Producer side -- push feedback from the engine thread.
pub struct FeedbackProducer {
    producer: HeapProd<u8>,
}

impl FeedbackProducer {
    /// Writes the whole group or nothing. Returns `false` if the queue is full.
    #[inline]
    pub fn push(&mut self, message: FeedbackMessage) -> bool {
        if self.producer.vacant_len() < FEEDBACK_MESSAGE_LEN {
            return false;
        }
        self.producer.push_slice(&message.to_bytes()) == FEEDBACK_MESSAGE_LEN
    }

    /// Raw byte stream. Returns the number of bytes written.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) -> usize {
        self.producer.push_slice(bytes)
    }

    #[inline]
    pub fn vacant_len(&self) -> usize {
        self.producer.vacant_len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.producer.capacity().get()
    }
}

impl std::fmt::Debug for FeedbackProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackProducer")
            .field("vacant", &self.producer.vacant_len())
            .finish()
    }
}

/// Consumer side -- owned by the relay worker.
pub struct FeedbackConsumer {
    consumer: HeapCons<u8>,
}

impl FeedbackQueue for FeedbackConsumer {
    #[inline]
    fn read_avail(&self) -> usize {
        self.consumer.occupied_len()
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<u8> {
        let (head, tail) = self.consumer.as_slices();
        if offset < head.len() {
            Some(head[offset])
        } else {
            tail.get(offset - head.len()).copied()
        }
    }

    #[inline]
    fn commit(&mut self, count: usize) {
        self.consumer.skip(count);
    }
}

impl std::fmt::Debug for FeedbackConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackConsumer")
            .field("occupied", &self.consumer.occupied_len())
            .finish()
    }
}

/// In-memory queue for owners that feed the relay from the same thread, and for tests.
impl FeedbackQueue for VecDeque<u8> {
    fn read_avail(&self) -> usize {
        self.len()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.get(offset).copied()
    }

    fn commit(&mut self, count: usize) {
        let count = count.min(self.len());
        self.drain(..count);
    }
}

pub fn feedback_channel() -> (FeedbackProducer, FeedbackConsumer) {
    feedback_channel_with_capacity(DEFAULT_QUEUE_CAPACITY)
}

/// `capacity` is in bytes, rounded up to hold at least one message.
pub fn feedback_channel_with_capacity(capacity: usize) -> (FeedbackProducer, FeedbackConsumer) {
    let rb = HeapRb::<u8>::new(capacity.max(FEEDBACK_MESSAGE_LEN));
    let (producer, consumer) = rb.split();
    (
        FeedbackProducer { producer },
        FeedbackConsumer { consumer },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_holds_at_least_one_message() {
        let (mut tx, rx) = feedback_channel_with_capacity(0);
        assert_eq!(tx.capacity(), FEEDBACK_MESSAGE_LEN);
        assert!(tx.push(FeedbackMessage::control_change(0, 7, 1)));
        assert!(!tx.push(FeedbackMessage::control_change(0, 7, 2)));
        assert_eq!(rx.read_avail(), FEEDBACK_MESSAGE_LEN);
    }

    #[test]
    fn test_push_and_peek_message() {
        let (mut tx, rx) = feedback_channel_with_capacity(12);
        assert!(tx.push(FeedbackMessage::new(0xB0, 7, 64)));

        assert_eq!(rx.read_avail(), 3);
        assert_eq!(rx.peek_message(), Some(FeedbackMessage::new(0xB0, 7, 64)));
        // Peeking does not consume
        assert_eq!(rx.read_avail(), 3);
    }

    #[test]
    fn test_commit_advances_read_position() {
        let (mut tx, mut rx) = feedback_channel_with_capacity(12);
        tx.push(FeedbackMessage::new(0xB0, 1, 2));
        tx.push(FeedbackMessage::new(0xB1, 3, 4));

        rx.commit(3);
        assert_eq!(rx.read_avail(), 3);
        assert_eq!(rx.peek_message(), Some(FeedbackMessage::new(0xB1, 3, 4)));
    }

    #[test]
    fn test_push_is_all_or_nothing() {
        let (mut tx, rx) = feedback_channel_with_capacity(5);
        assert!(tx.push(FeedbackMessage::new(0xB0, 1, 2)));
        // Only 2 bytes left
        assert!(!tx.push(FeedbackMessage::new(0xB0, 3, 4)));
        assert_eq!(rx.read_avail(), 3);
    }

    #[test]
    fn test_partial_group_not_a_message() {
        let (mut tx, rx) = feedback_channel_with_capacity(12);
        assert_eq!(tx.push_bytes(&[0xB0, 7]), 2);
        assert_eq!(rx.read_avail(), 2);
        assert_eq!(rx.peek(1), Some(7));
        assert_eq!(rx.peek(2), None);
        assert!(rx.peek_message().is_none());
    }

    #[test]
    fn test_peek_across_wraparound() {
        let (mut tx, mut rx) = feedback_channel_with_capacity(4);
        tx.push_bytes(&[1, 2, 3]);
        rx.commit(3);
        // Write position wraps: storage holds [5, 6, _, 4]
        assert_eq!(tx.push_bytes(&[4, 5, 6]), 3);

        assert_eq!(rx.peek(0), Some(4));
        assert_eq!(rx.peek(1), Some(5));
        assert_eq!(rx.peek(2), Some(6));
        assert_eq!(rx.peek_message(), Some(FeedbackMessage::new(4, 5, 6)));
    }

    #[test]
    fn test_vecdeque_queue() {
        let mut queue: VecDeque<u8> = [0xB2, 10, 20, 0x90].into_iter().collect();
        assert_eq!(queue.peek_message(), Some(FeedbackMessage::new(0xB2, 10, 20)));
        queue.commit(3);
        assert_eq!(queue.read_avail(), 1);
        assert!(queue.peek_message().is_none());
    }
}
