//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid argument
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Carga library error
    #[error(transparent)]
    Carga(#[from] carga::CargaError),

    /// JSON body error
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display() {
        let err = CliError::invalid_argument("expected name:value");
        assert_eq!(err.to_string(), "invalid argument: expected name:value");
    }

    #[test]
    fn test_carga_error_is_transparent() {
        let err: CliError = carga::CargaError::config("bad knob").into();
        assert_eq!(err.to_string(), "configuration error: bad knob");
    }
}
