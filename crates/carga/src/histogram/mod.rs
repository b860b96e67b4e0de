//! Online statistics for a benchmark run.
//!
//! Two aggregates feed the final report:
//! - [`LatencyHistogram`]: every attempt's round-trip time, reduced to
//!   average / min / max / stddev and percentile cut-points after the run.
//! - [`ThroughputHistogram`]: response sizes keyed by elapsed wall-clock
//!   time into five time-quantile buckets of the test window.
//!
//! Both accept concurrent writers during the active window; the single
//! finalize pass runs strictly after the worker join barrier.

pub mod latency;
pub mod throughput;

pub use latency::{LatencyHistogram, LatencySummary};
pub use throughput::{ThroughputHistogram, ThroughputSummary, BUCKET_QUANTILES};
