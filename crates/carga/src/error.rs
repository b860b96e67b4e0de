//! Error types for the carga library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for carga operations.
pub type CargaResult<T> = Result<T, CargaError>;

/// Errors that can occur while configuring or driving a benchmark run.
///
/// Everything here is a configuration-time failure: per-request transport
/// failures during an active run are classified into the run counters
/// instead of being surfaced as errors.
#[derive(Debug, Error)]
pub enum CargaError {
    /// The target could not be parsed as a URL.
    #[error("invalid target URL `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The target URL uses a scheme the transport cannot drive.
    #[error("unsupported scheme `{0}`: expected http or https")]
    UnsupportedScheme(String),

    /// A configuration knob failed validation.
    #[error("configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// A file attachment could not be read.
    #[error("cannot attach `{path}`: {source}")]
    Attachment {
        /// Path that failed to open or read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A request body could not be serialized.
    #[error("cannot serialize request body: {0}")]
    Body(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CargaError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an attachment error for the given path.
    #[must_use]
    pub fn attachment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Attachment {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = CargaError::config("concurrency must be at least 1");
        assert_eq!(
            err.to_string(),
            "configuration error: concurrency must be at least 1"
        );
    }

    #[test]
    fn test_unsupported_scheme_display() {
        let err = CargaError::UnsupportedScheme("ftp".to_string());
        assert!(err.to_string().contains("ftp"));
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_attachment_error_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = CargaError::attachment("/tmp/upload.bin", io);
        assert!(err.to_string().contains("/tmp/upload.bin"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: CargaError = io.into();
        assert!(matches!(err, CargaError::Io(_)));
    }
}
