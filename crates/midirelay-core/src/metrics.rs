//! Relay counters for the drain loop.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayMetricsSnapshot {
    pub wakes: u64,
    pub drain_passes: u64,
    pub received: u64,
    pub sent: u64,
    pub dropped: u64,
    pub emit_failures: u64,
}

/// Lock-free counters updated by the relay worker and read by anyone.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    wakes: AtomicU64,
    drain_passes: AtomicU64,
    received: AtomicU64,
    sent: AtomicU64,
    dropped: AtomicU64,
    emit_failures: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_wake(&self) {
        self.wakes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_drain_pass(&self) {
        self.drain_passes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Unexpected status byte.
    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_emit_failure(&self) {
        self.emit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn wakes(&self) -> u64 {
        self.wakes.load(Ordering::Relaxed)
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> RelayMetricsSnapshot {
        RelayMetricsSnapshot {
            wakes: self.wakes.load(Ordering::Relaxed),
            drain_passes: self.drain_passes.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            emit_failures: self.emit_failures.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.wakes.store(0, Ordering::Relaxed);
        self.drain_passes.store(0, Ordering::Relaxed);
        self.received.store(0, Ordering::Relaxed);
        self.sent.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.emit_failures.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_reset() {
        let metrics = RelayMetrics::new();
        metrics.record_wake();
        metrics.record_received();
        metrics.record_received();
        metrics.record_sent();
        metrics.record_dropped();

        let snap = metrics.snapshot();
        assert_eq!(snap.wakes, 1);
        assert_eq!(snap.received, 2);
        assert_eq!(snap.sent, 1);
        assert_eq!(snap.dropped, 1);
        assert_eq!(snap.emit_failures, 0);

        metrics.reset();
        assert_eq!(metrics.snapshot(), RelayMetricsSnapshot::default());
    }
}
