//! Time-bucketed throughput accumulation.
//!
//! Not a statistical percentile: the five buckets are cut at fixed
//! quantiles of the declared test window and sketch how request rate and
//! payload size trended across the run.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;

/// Time-quantile cut points over the declared duration.
pub const BUCKET_QUANTILES: [f64; 5] = [0.01, 0.10, 0.50, 0.97, 0.99];

#[derive(Debug, Default, Clone, Copy)]
struct Buckets {
    counts: [u64; 5],
    sizes: [u64; 5],
}

/// Five time buckets over the declared test window.
///
/// Bucket 0 covers `[0, cut[0]]`, bucket *i* covers `(cut[i-1], cut[i]]`.
/// Observations past the last cut point are dropped. Counts carry forward:
/// once traffic has started, a later bucket never reads as zero.
#[derive(Debug)]
pub struct ThroughputHistogram {
    cutpoints: [f64; 5],
    buckets: Mutex<Buckets>,
}

impl ThroughputHistogram {
    /// Create a histogram for a run of `duration_secs` seconds.
    #[must_use]
    pub fn new(duration_secs: u64) -> Self {
        let mut cutpoints = [0.0; 5];
        for (cut, q) in cutpoints.iter_mut().zip(BUCKET_QUANTILES) {
            *cut = duration_secs as f64 * q;
        }
        Self {
            cutpoints,
            buckets: Mutex::new(Buckets::default()),
        }
    }

    /// Record one completed response of `size` bytes observed at `elapsed`
    /// since run start.
    ///
    /// The located bucket's count is incremented and its representative
    /// size overwritten (last write wins). A bucket first reached while
    /// still at zero inherits the previous bucket's count, so counts never
    /// regress once traffic has started.
    pub fn record(&self, elapsed: Duration, size: u64) {
        let Some(idx) = self.bucket_index(elapsed.as_secs_f64()) else {
            return;
        };
        if let Ok(mut buckets) = self.buckets.lock() {
            if idx > 0 && buckets.counts[idx] == 0 {
                buckets.counts[idx] = buckets.counts[idx - 1];
            }
            buckets.counts[idx] += 1;
            buckets.sizes[idx] = size;
        }
    }

    /// Index of the bucket covering `secs`, or `None` past the last cut.
    fn bucket_index(&self, secs: f64) -> Option<usize> {
        self.cutpoints.iter().position(|&cut| secs <= cut)
    }

    /// Freeze the buckets. Called once, after all writers have stopped.
    pub fn finalize(&self) -> ThroughputSummary {
        let buckets = self
            .buckets
            .lock()
            .map_or_else(|_| Buckets::default(), |buckets| *buckets);
        ThroughputSummary {
            requests: buckets.counts,
            sizes: buckets.sizes,
        }
    }
}

/// Frozen throughput buckets for one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThroughputSummary {
    /// Request count per time bucket.
    pub requests: [u64; 5],
    /// Last observed size per time bucket, bytes.
    pub sizes: [u64; 5],
}

impl ThroughputSummary {
    /// Mean of the five request counts (integer division).
    #[must_use]
    pub fn requests_avg(&self) -> u64 {
        avg(&self.requests)
    }

    /// Population standard deviation of the five request counts.
    #[must_use]
    pub fn requests_std_dev(&self) -> f64 {
        std_dev(&self.requests)
    }

    /// Mean of the five sizes (integer division).
    #[must_use]
    pub fn sizes_avg(&self) -> u64 {
        avg(&self.sizes)
    }

    /// Population standard deviation of the five sizes.
    #[must_use]
    pub fn sizes_std_dev(&self) -> f64 {
        std_dev(&self.sizes)
    }
}

fn avg(values: &[u64; 5]) -> u64 {
    values.iter().sum::<u64>() / values.len() as u64
}

fn std_dev(values: &[u64; 5]) -> f64 {
    let mean = avg(values) as f64;
    let mean_sq = values
        .iter()
        .map(|&v| {
            let deviation = mean - v as f64;
            deviation * deviation
        })
        .sum::<f64>()
        / values.len() as f64;
    mean_sq.sqrt()
}
