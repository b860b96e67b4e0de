//! Shared run counters.
//!
//! Many workers increment, the reporter reads once after the join barrier.
//! All counters are monotone; `ok + errors == total` once every in-flight
//! attempt has been classified.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared by every worker of one run.
#[derive(Debug, Default)]
pub struct RunCounters {
    total: AtomicU64,
    ok: AtomicU64,
    errors: AtomicU64,
    timeouts: AtomicU64,
    bytes_read: AtomicU64,
}

impl RunCounters {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one issued attempt. Called exactly once per loop iteration.
    pub fn record_attempt(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a completed round trip with a 2xx status.
    pub fn record_ok(&self) {
        self.ok.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a non-2xx response or transport failure.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a deadline-exceeded failure. The caller records the error
    /// separately; timeouts are a subset of errors, not a third class.
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Add response bytes (body plus serialized headers) and return the new
    /// cumulative total.
    pub fn add_bytes(&self, n: u64) -> u64 {
        self.bytes_read.fetch_add(n, Ordering::Relaxed) + n
    }

    /// Total attempts issued so far.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Read every counter at once.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total: self.total.load(Ordering::Relaxed),
            ok: self.ok.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`RunCounters`], taken once at run end.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Attempts issued.
    pub total: u64,
    /// Responses with status in [200, 300).
    pub ok: u64,
    /// Non-2xx responses plus transport failures.
    pub errors: u64,
    /// Deadline-exceeded failures (subset of `errors`).
    pub timeouts: u64,
    /// Cumulative body + header bytes read.
    pub bytes_read: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_classification_invariant() {
        let counters = RunCounters::new();
        for _ in 0..7 {
            counters.record_attempt();
            counters.record_ok();
        }
        for _ in 0..3 {
            counters.record_attempt();
            counters.record_error();
        }
        counters.record_timeout();

        let snap = counters.snapshot();
        assert_eq!(snap.total, 10);
        assert_eq!(snap.ok + snap.errors, snap.total);
        assert_eq!(snap.timeouts, 1);
        assert!(snap.timeouts <= snap.errors);
    }

    #[test]
    fn test_add_bytes_returns_cumulative() {
        let counters = RunCounters::new();
        assert_eq!(counters.add_bytes(100), 100);
        assert_eq!(counters.add_bytes(50), 150);
        assert_eq!(counters.snapshot().bytes_read, 150);
    }

    #[test]
    fn test_no_lost_updates_under_contention() {
        // N tasks each incrementing K times must yield exactly N*K.
        const THREADS: usize = 8;
        const INCREMENTS: u64 = 10_000;

        let counters = Arc::new(RunCounters::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let counters = Arc::clone(&counters);
                std::thread::spawn(move || {
                    for _ in 0..INCREMENTS {
                        counters.record_attempt();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters.total(), THREADS as u64 * INCREMENTS);
    }

    #[test]
    fn test_snapshot_serialization() {
        let counters = RunCounters::new();
        counters.record_attempt();
        counters.record_ok();
        counters.add_bytes(5);

        let json = serde_json::to_string(&counters.snapshot()).unwrap();
        assert!(json.contains("\"total\":1"));
        assert!(json.contains("\"bytes_read\":5"));
    }
}
