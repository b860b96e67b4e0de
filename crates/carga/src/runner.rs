//! Benchmark execution: worker fan-out, cancellation, and aggregation.

use crate::config::BenchmarkConfig;
use crate::counters::{CounterSnapshot, RunCounters};
use crate::error::CargaResult;
use crate::histogram::{LatencyHistogram, LatencySummary, ThroughputHistogram, ThroughputSummary};
use crate::request::RequestTemplate;
use crate::transport::PipelineTransport;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything the workers of one run share.
///
/// One context per run, passed by `Arc`; independent runs never touch each
/// other's counters or histograms.
#[derive(Debug)]
pub struct RunContext {
    /// Shared atomic counters.
    pub counters: RunCounters,
    /// Round-trip latency samples.
    pub latency: LatencyHistogram,
    /// Time-bucketed throughput.
    pub throughput: ThroughputHistogram,
}

impl RunContext {
    /// Create a fresh context for a run of `duration_secs`.
    #[must_use]
    pub fn new(duration_secs: u64) -> Self {
        Self {
            counters: RunCounters::new(),
            latency: LatencyHistogram::new(),
            throughput: ThroughputHistogram::new(duration_secs),
        }
    }
}

/// Drives one benchmark run to completion.
///
/// Spawns `concurrency x pipeline` workers, lets them tight-loop against
/// the target for the declared duration, then signals the stop flag, joins
/// every worker, and freezes the aggregates. The join barrier guarantees
/// the finalize pass never races an in-flight writer.
#[derive(Debug)]
pub struct LoadRunner {
    config: BenchmarkConfig,
}

impl LoadRunner {
    /// Create a runner for a validated configuration.
    #[must_use]
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// The configuration this runner executes.
    #[must_use]
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Execute the run and return the frozen report.
    pub async fn run(&self) -> CargaResult<BenchmarkReport> {
        let config = &self.config;
        let template = Arc::new(RequestTemplate::prepare(config)?);
        let ctx = Arc::new(RunContext::new(config.duration_secs));
        let stop = Arc::new(AtomicBool::new(false));
        let started = Instant::now();

        info!(
            url = %config.url,
            concurrency = config.concurrency,
            pipeline = config.pipeline,
            duration_secs = config.duration_secs,
            "starting run"
        );

        let mut workers = Vec::with_capacity(config.concurrency * config.pipeline);
        for slot in 0..config.concurrency {
            // Pipeline lanes share one transport per concurrency slot.
            let transport = Arc::new(PipelineTransport::connect(
                &config.target,
                config.pipeline,
                config.timeout_secs,
            )?);
            for lane in 0..config.pipeline {
                let template = Arc::clone(&template);
                let transport = Arc::clone(&transport);
                let ctx = Arc::clone(&ctx);
                let stop = Arc::clone(&stop);
                workers.push(tokio::spawn(async move {
                    worker_loop(&template, &transport, &ctx, &stop, started).await;
                    debug!(slot, lane, "worker exited");
                }));
            }
        }

        tokio::time::sleep(Duration::from_secs(config.duration_secs)).await;
        stop.store(true, Ordering::Relaxed);

        // Join barrier: aggregates are read only after every worker has
        // observed the stop flag and exited.
        for worker in workers {
            let _ = worker.await;
        }
        let elapsed = started.elapsed();

        let report = BenchmarkReport {
            url: config.url.clone(),
            method: config.method.to_string(),
            concurrency: config.concurrency,
            pipeline: config.pipeline,
            duration_secs: config.duration_secs,
            elapsed_secs: elapsed.as_secs_f64(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            counters: ctx.counters.snapshot(),
            latency: ctx.latency.finalize(),
            throughput: ctx.throughput.finalize(),
        };
        info!(
            total = report.counters.total,
            ok = report.counters.ok,
            errors = report.counters.errors,
            "run complete"
        );
        Ok(report)
    }
}

/// One worker's open loop: no pacing, no retry, one classification per
/// attempt.
async fn worker_loop(
    template: &RequestTemplate,
    transport: &PipelineTransport,
    ctx: &RunContext,
    stop: &AtomicBool,
    started: Instant,
) {
    while !stop.load(Ordering::Relaxed) {
        let request = template.instantiate();
        ctx.counters.record_attempt();
        let attempt_started = Instant::now();

        match transport.send(request).await {
            Ok(exchange) => {
                ctx.latency.record(attempt_started.elapsed());
                let cumulative = ctx.counters.add_bytes(exchange.total_bytes());
                ctx.throughput.record(started.elapsed(), cumulative);
                if exchange.is_success() {
                    ctx.counters.record_ok();
                } else {
                    ctx.counters.record_error();
                }
            }
            Err(error) => {
                // Failures still cost a sample; the loop continues with a
                // fresh attempt.
                ctx.latency.record(attempt_started.elapsed());
                ctx.counters.record_error();
                if error.is_timeout() {
                    ctx.counters.record_timeout();
                }
            }
        }
    }
}

/// Frozen result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Target URL.
    pub url: String,
    /// HTTP method driven.
    pub method: String,
    /// Concurrent connections used.
    pub concurrency: usize,
    /// Pipeline depth used.
    pub pipeline: usize,
    /// Declared duration in seconds.
    pub duration_secs: u64,
    /// Measured wall time of the run.
    pub elapsed_secs: f64,
    /// RFC 3339 timestamp of completion.
    pub timestamp: String,
    /// Final counter values.
    pub counters: CounterSnapshot,
    /// Latency statistics; `None` when no attempt completed recording.
    pub latency: Option<LatencySummary>,
    /// Throughput buckets.
    pub throughput: ThroughputSummary,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{BenchmarkConfig, HttpMethod};

    fn config_for(url: &str) -> BenchmarkConfig {
        BenchmarkConfig::builder(HttpMethod::Get, url)
            .concurrency(1)
            .duration_secs(1)
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_context_is_per_run() {
        let a = RunContext::new(10);
        let b = RunContext::new(10);
        a.counters.record_attempt();
        assert_eq!(a.counters.total(), 1);
        assert_eq!(b.counters.total(), 0);
    }

    #[test]
    fn test_runner_exposes_config() {
        let runner = LoadRunner::new(config_for("http://localhost:1/"));
        assert_eq!(runner.config().concurrency, 1);
        assert_eq!(runner.config().url, "http://localhost:1/");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unreachable_target_counts_errors_not_timeouts() {
        // Port 1 refuses immediately: every attempt is an error, none a
        // timeout, and the invariant ok + errors == total holds.
        let config = BenchmarkConfig::builder(HttpMethod::Get, "http://127.0.0.1:1/")
            .concurrency(2)
            .duration_secs(1)
            .timeout_secs(5)
            .build()
            .unwrap();
        let report = LoadRunner::new(config).run().await.unwrap();

        assert!(report.counters.total > 0);
        assert_eq!(report.counters.ok, 0);
        assert_eq!(report.counters.ok + report.counters.errors, report.counters.total);
        assert_eq!(report.counters.bytes_read, 0);
        // Every failed attempt still contributed a latency sample.
        assert_eq!(report.latency.unwrap().count, report.counters.total);
    }

    #[test]
    fn test_report_serialization_roundtrip() {
        let report = BenchmarkReport {
            url: "http://localhost:8080/".to_string(),
            method: "GET".to_string(),
            concurrency: 10,
            pipeline: 1,
            duration_secs: 10,
            elapsed_secs: 10.01,
            timestamp: "2026-08-07T00:00:00Z".to_string(),
            counters: CounterSnapshot::default(),
            latency: None,
            throughput: ThroughputHistogram::new(10).finalize(),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: BenchmarkReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url, report.url);
        assert!(back.latency.is_none());
        assert_eq!(back.throughput.requests, [0; 5]);
    }
}
