//! Carga: open-loop HTTP load generation with latency and throughput
//! histograms.
//!
//! Carga drives a target endpoint with many concurrent, optionally
//! pipelined, connections for a fixed wall-clock duration and reports
//! throughput, latency distribution, and error/timeout rates. It is an
//! open-loop generator: requests are issued back-to-back with no pacing,
//! bounded only by pipeline depth and target responsiveness.
//!
//! # Architecture
//!
//! ```text
//! BenchmarkConfig ──► LoadRunner ──► concurrency x pipeline workers
//!                         │                  │
//!                         │          PipelineTransport (per slot)
//!                         │                  │
//!                         └── RunContext ◄───┘
//!                             (counters + latency + throughput)
//!                                   │
//!                             BenchmarkReport ──► report tables / JSON
//! ```
//!
//! # Example
//!
//! ```no_run
//! use carga::{BenchmarkConfig, HttpMethod, LoadRunner};
//!
//! # async fn demo() -> carga::CargaResult<()> {
//! let config = BenchmarkConfig::builder(HttpMethod::Get, "http://localhost:8080/")
//!     .concurrency(50)
//!     .duration_secs(30)
//!     .pipeline(4)
//!     .build()?;
//! let report = LoadRunner::new(config).run().await?;
//! println!("{}", carga::report::render(&report));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod counters;
pub mod error;
pub mod histogram;
pub mod pool;
pub mod report;
pub mod request;
pub mod runner;
pub mod transport;

pub use config::{
    BenchmarkBuilder, BenchmarkConfig, BodySource, FileField, HttpMethod, Scheme, Target,
};
pub use counters::{CounterSnapshot, RunCounters};
pub use error::{CargaError, CargaResult};
pub use histogram::{LatencyHistogram, LatencySummary, ThroughputHistogram, ThroughputSummary};
pub use runner::{BenchmarkReport, LoadRunner, RunContext};
pub use transport::{Exchange, PipelineTransport, TransportError};
