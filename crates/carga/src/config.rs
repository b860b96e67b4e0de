//! Benchmark configuration: knobs, body sources, and target resolution.

use crate::error::{CargaError, CargaResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Default concurrent connections.
pub const DEFAULT_CONCURRENCY: usize = 10;
/// Default test duration in seconds.
pub const DEFAULT_DURATION_SECS: u64 = 10;
/// Default pipelined requests per connection.
pub const DEFAULT_PIPELINE: usize = 1;
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP methods the engine can drive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
    /// HTTP PATCH method
    Patch,
    /// HTTP HEAD method
    Head,
    /// HTTP OPTIONS method
    Options,
}

impl HttpMethod {
    /// Wire name of the method.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
        }
    }
}

/// One file attachment of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    /// Multipart field name.
    pub field: String,
    /// Path read at configuration time.
    pub path: PathBuf,
}

/// Request body selection. The three kinds are mutually exclusive per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodySource {
    /// No body.
    #[default]
    None,
    /// Raw JSON bytes, serialized once at configuration time.
    Json(Vec<u8>),
    /// URL-encoded field map.
    Form(Vec<(String, String)>),
    /// Multipart file set; several paths may share one field name.
    Files(Vec<FileField>),
}

/// Scheme of the resolved target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plaintext HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

/// Resolved transport address: one (host, port, scheme).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    /// Scheme; decides whether the transport uses TLS.
    pub scheme: Scheme,
    /// Hostname from the URL.
    pub host: String,
    /// Explicit port, or the scheme default (80/443).
    pub port: u16,
}

impl Target {
    /// Parse and validate a target URL.
    pub fn resolve(raw: &str) -> CargaResult<Self> {
        let url = Url::parse(raw).map_err(|e| CargaError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(CargaError::UnsupportedScheme(other.to_string())),
        };
        let host = url
            .host_str()
            .ok_or_else(|| CargaError::InvalidUrl {
                url: raw.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_string();
        let port = url.port_or_known_default().unwrap_or(match scheme {
            Scheme::Http => 80,
            Scheme::Https => 443,
        });
        Ok(Self { scheme, host, port })
    }

    /// `host:port` form, for logs and diagnostics.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when the transport must speak TLS.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::Https
    }
}

/// Immutable configuration for one benchmark run.
///
/// Built with [`BenchmarkBuilder`]; validated once, then consumed by
/// [`LoadRunner`](crate::runner::LoadRunner).
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// HTTP method of every attempt.
    pub method: HttpMethod,
    /// Full target URL as given.
    pub url: String,
    /// Resolved transport address.
    pub target: Target,
    /// Request headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Cookies, joined into one `Cookie` header.
    pub cookies: Vec<(String, String)>,
    /// Content-type override; wins over the body-derived default.
    pub content_type: Option<String>,
    /// Body selection.
    pub body: BodySource,
    /// Concurrent connections (>= 1).
    pub concurrency: usize,
    /// Test window in seconds (>= 1).
    pub duration_secs: u64,
    /// Pipelined requests per connection (>= 1).
    pub pipeline: usize,
    /// Per-request timeout in seconds (>= 1).
    pub timeout_secs: u64,
}

impl BenchmarkConfig {
    /// Start building a configuration for `method` against `url`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> BenchmarkBuilder {
        BenchmarkBuilder::new(method, url)
    }
}

/// Stepwise builder for [`BenchmarkConfig`].
///
/// Every knob has a default; `build()` validates the lot and resolves the
/// target so a bad configuration fails before any worker starts.
#[derive(Debug, Clone)]
pub struct BenchmarkBuilder {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    content_type: Option<String>,
    json: Option<serde_json::Value>,
    form: Vec<(String, String)>,
    files: Vec<FileField>,
    concurrency: usize,
    duration_secs: u64,
    pipeline: usize,
    timeout_secs: u64,
}

impl BenchmarkBuilder {
    /// Create a builder with the documented defaults.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            cookies: Vec::new(),
            content_type: None,
            json: None,
            form: Vec::new(),
            files: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            duration_secs: DEFAULT_DURATION_SECS,
            pipeline: DEFAULT_PIPELINE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Add one request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add one cookie.
    #[must_use]
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Override the content type derived from the body source.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Send a JSON body.
    #[must_use]
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Add one URL-encoded form field.
    #[must_use]
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// Attach one file under `field`.
    #[must_use]
    pub fn file(mut self, field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.push(FileField {
            field: field.into(),
            path: path.into(),
        });
        self
    }

    /// Attach several files sharing one field name.
    #[must_use]
    pub fn files(mut self, field: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        let field = field.into();
        for path in paths {
            self.files.push(FileField {
                field: field.clone(),
                path,
            });
        }
        self
    }

    /// Concurrent connections to open.
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Seconds to run.
    #[must_use]
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Pipelined requests per connection.
    #[must_use]
    pub fn pipeline(mut self, depth: usize) -> Self {
        self.pipeline = depth;
        self
    }

    /// Per-request timeout in seconds.
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> CargaResult<BenchmarkConfig> {
        if self.concurrency == 0 {
            return Err(CargaError::config("concurrency must be at least 1"));
        }
        if self.duration_secs == 0 {
            return Err(CargaError::config("duration must be at least 1 second"));
        }
        if self.pipeline == 0 {
            return Err(CargaError::config("pipeline depth must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(CargaError::config("timeout must be at least 1 second"));
        }

        let kinds = usize::from(self.json.is_some())
            + usize::from(!self.form.is_empty())
            + usize::from(!self.files.is_empty());
        if kinds > 1 {
            return Err(CargaError::config(
                "json, form, and file bodies are mutually exclusive",
            ));
        }

        let body = if let Some(value) = self.json {
            BodySource::Json(serde_json::to_vec(&value)?)
        } else if !self.form.is_empty() {
            BodySource::Form(self.form)
        } else if !self.files.is_empty() {
            BodySource::Files(self.files)
        } else {
            BodySource::None
        };

        let target = Target::resolve(&self.url)?;

        Ok(BenchmarkConfig {
            method: self.method,
            url: self.url,
            target,
            headers: self.headers,
            cookies: self.cookies,
            content_type: self.content_type,
            body,
            concurrency: self.concurrency,
            duration_secs: self.duration_secs,
            pipeline: self.pipeline,
            timeout_secs: self.timeout_secs,
        })
    }
}
