//! Round-trip latency accumulation and reduction.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Append-only latency sample set with a one-shot reduction.
///
/// Workers call [`record`](Self::record) concurrently for every attempt,
/// success or failure. [`finalize`](Self::finalize) copies and sorts the
/// samples once, after all writers have stopped.
#[derive(Debug, Default)]
pub struct LatencyHistogram {
    samples: Mutex<Vec<Duration>>,
}

impl LatencyHistogram {
    /// Create an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one round-trip observation.
    pub fn record(&self, elapsed: Duration) {
        if let Ok(mut samples) = self.samples.lock() {
            samples.push(elapsed);
        }
    }

    /// Number of samples recorded so far.
    pub fn len(&self) -> usize {
        self.samples.lock().map_or(0, |samples| samples.len())
    }

    /// True when no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reduce the sample set to summary statistics.
    ///
    /// Returns `None` on an empty sample set so reporting can skip the
    /// latency table without faulting.
    pub fn finalize(&self) -> Option<LatencySummary> {
        let mut sorted = match self.samples.lock() {
            Ok(samples) if !samples.is_empty() => samples.clone(),
            _ => return None,
        };
        sorted.sort_unstable();

        let n = sorted.len();
        let avg_ms = sorted.iter().map(Duration::as_secs_f64).sum::<f64>() / n as f64 * 1000.0;
        let variance_ms = sorted
            .iter()
            .map(|d| {
                let deviation = d.as_secs_f64() * 1000.0 - avg_ms;
                deviation * deviation
            })
            .sum::<f64>()
            / n as f64;

        Some(LatencySummary {
            count: n as u64,
            avg_ms,
            min_ms: sorted[0].as_secs_f64() * 1000.0,
            max_ms: sorted[n - 1].as_secs_f64() * 1000.0,
            std_dev_ms: variance_ms.sqrt(),
            p1_ms: percentile_ms(&sorted, 0.01),
            p10_ms: percentile_ms(&sorted, 0.10),
            // The median deliberately uses the plain midpoint index rather
            // than the rank formula below; output stays comparable with the
            // historical rendering.
            p50_ms: sorted[n / 2].as_millis() as u64,
            p97_ms: percentile_ms(&sorted, 0.97),
            p99_ms: percentile_ms(&sorted, 0.99),
        })
    }
}

/// Percentile cut-point over an ascending sample set, in whole milliseconds.
///
/// rank = max(0, floor(n·p + 0.5) − 1)
fn percentile_ms(sorted: &[Duration], p: f64) -> u64 {
    let rank = (sorted.len() as f64 * p + 0.5).floor() as i64 - 1;
    let idx = rank.max(0) as usize;
    sorted[idx.min(sorted.len() - 1)].as_millis() as u64
}

/// Reduced latency statistics for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Number of observations.
    pub count: u64,
    /// Mean round-trip time in milliseconds.
    pub avg_ms: f64,
    /// Fastest observation in milliseconds.
    pub min_ms: f64,
    /// Slowest observation in milliseconds.
    pub max_ms: f64,
    /// Population standard deviation in milliseconds.
    pub std_dev_ms: f64,
    /// 1st percentile cut-point, whole milliseconds.
    pub p1_ms: u64,
    /// 10th percentile cut-point, whole milliseconds.
    pub p10_ms: u64,
    /// Median (midpoint-index rule), whole milliseconds.
    pub p50_ms: u64,
    /// 97th percentile cut-point, whole milliseconds.
    pub p97_ms: u64,
    /// 99th percentile cut-point, whole milliseconds.
    pub p99_ms: u64,
}
