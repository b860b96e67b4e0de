//! Pipelined transport to a single target.

use crate::config::Target;
use crate::error::CargaResult;
use crate::pool::ObjectPool;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Outcome of one completed round trip.
#[derive(Debug, Clone, Copy)]
pub struct Exchange {
    /// HTTP status code.
    pub status: u16,
    /// Bytes of serialized response header names and values.
    pub header_bytes: u64,
    /// Bytes of response body.
    pub body_bytes: u64,
}

impl Exchange {
    /// True for status in [200, 300).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body plus header bytes read for this exchange.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.header_bytes + self.body_bytes
    }
}

/// Per-attempt transport failure. Non-fatal: the worker classifies it and
/// loops with a fresh attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The per-request deadline elapsed before the response arrived.
    #[error("request timed out")]
    TimedOut,
    /// Any other transport-level failure (connect, reset, protocol).
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

impl TransportError {
    /// True for deadline-exceeded failures.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Client for one concurrency slot, bound to a single (host, port, scheme).
///
/// Up to *pipeline* requests may be outstanding at once: the pipeline lanes
/// of a slot share this transport, and the underlying connection pool is
/// sized to the pipeline depth. Response bodies are read into pooled
/// buffers so sustained load does not allocate per attempt.
#[derive(Debug)]
pub struct PipelineTransport {
    client: reqwest::Client,
    target: Target,
    timeout: Duration,
    buffers: ObjectPool<Vec<u8>>,
}

impl PipelineTransport {
    /// Build a transport for `target` holding at most `pipeline` requests
    /// in flight, each bounded by `timeout_secs`.
    pub fn connect(target: &Target, pipeline: usize, timeout_secs: u64) -> CargaResult<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(pipeline)
            .build()?;
        debug!(
            addr = %target.addr(),
            tls = target.is_tls(),
            pipeline,
            "transport ready"
        );
        Ok(Self {
            client,
            target: target.clone(),
            timeout: Duration::from_secs(timeout_secs),
            buffers: ObjectPool::new(Vec::new),
        })
    }

    /// Target this transport is bound to.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Issue one request and await its response or the deadline.
    ///
    /// Timeouts are reported as [`TransportError::TimedOut`] whether they
    /// come from the outer deadline or from inside the client.
    pub async fn send(&self, request: reqwest::Request) -> Result<Exchange, TransportError> {
        match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Err(_elapsed) => Err(TransportError::TimedOut),
            Ok(Err(e)) if e.is_timeout() => Err(TransportError::TimedOut),
            Ok(Err(e)) => Err(TransportError::Transport(e)),
            Ok(Ok(exchange)) => Ok(exchange),
        }
    }

    async fn exchange(&self, request: reqwest::Request) -> Result<Exchange, reqwest::Error> {
        let mut response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let header_bytes: u64 = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().len() + value.as_bytes().len()) as u64)
            .sum();

        // Drain the body through a recycled buffer; the allocation survives
        // the attempt via the pool.
        let mut buf = self.buffers.acquire();
        buf.clear();
        while let Some(chunk) = response.chunk().await? {
            buf.extend_from_slice(&chunk);
        }

        Ok(Exchange {
            status,
            header_bytes,
            body_bytes: buf.len() as u64,
        })
    }
}
