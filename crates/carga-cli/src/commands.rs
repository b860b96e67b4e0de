//! CLI command definition using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Cargador: CLI for Carga - open-loop HTTP load testing
#[derive(Parser, Debug)]
#[command(name = "cargador")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target URL (http or https)
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "get")]
    pub method: MethodArg,

    /// Request header (`name: value`), repeatable
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request cookie (`name=value`), repeatable
    #[arg(long = "cookie")]
    pub cookies: Vec<String>,

    /// Content-Type override
    #[arg(long)]
    pub content_type: Option<String>,

    /// JSON body: an inline value or `@path` to read from a file
    #[arg(long, conflicts_with_all = ["forms", "files"])]
    pub json: Option<String>,

    /// URL-encoded form field (`key=value`), repeatable
    #[arg(long = "form", conflicts_with = "files")]
    pub forms: Vec<String>,

    /// File attachment (`field=path`), repeatable; sent as multipart/form-data
    #[arg(long = "file")]
    pub files: Vec<String>,

    /// Concurrent connections
    #[arg(short = 'c', long, default_value = "10")]
    pub connections: usize,

    /// Test duration in seconds
    #[arg(short = 'd', long, default_value = "10")]
    pub duration: u64,

    /// Pipelined requests per connection
    #[arg(short = 'p', long, default_value = "1")]
    pub pipeline: usize,

    /// Per-request timeout in seconds
    #[arg(short = 't', long, default_value = "10")]
    pub timeout: u64,

    /// Write the report as pretty JSON to this path
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Suppress the banner and tables
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// HTTP method argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum MethodArg {
    /// HTTP GET
    #[default]
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
}

impl From<MethodArg> for carga::HttpMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Get => Self::Get,
            MethodArg::Post => Self::Post,
            MethodArg::Put => Self::Put,
            MethodArg::Delete => Self::Delete,
            MethodArg::Patch => Self::Patch,
            MethodArg::Head => Self::Head,
            MethodArg::Options => Self::Options,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation_uses_defaults() {
        let cli = Cli::try_parse_from(["cargador", "http://localhost:8080/"]).unwrap();
        assert_eq!(cli.url, "http://localhost:8080/");
        assert_eq!(cli.connections, 10);
        assert_eq!(cli.duration, 10);
        assert_eq!(cli.pipeline, 1);
        assert_eq!(cli.timeout, 10);
        assert!(matches!(cli.method, MethodArg::Get));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "cargador",
            "https://api.example.com/v1/items",
            "-X",
            "post",
            "-H",
            "authorization: Bearer token",
            "--cookie",
            "session=abc",
            "--json",
            r#"{"n":1}"#,
            "-c",
            "100",
            "-d",
            "30",
            "-p",
            "4",
            "-t",
            "5",
            "-o",
            "result.json",
        ])
        .unwrap();
        assert!(matches!(cli.method, MethodArg::Post));
        assert_eq!(cli.headers.len(), 1);
        assert_eq!(cli.cookies.len(), 1);
        assert_eq!(cli.connections, 100);
        assert_eq!(cli.duration, 30);
        assert_eq!(cli.pipeline, 4);
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.output, Some(PathBuf::from("result.json")));
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["cargador"]).is_err());
    }

    #[test]
    fn test_body_flags_conflict() {
        assert!(Cli::try_parse_from([
            "cargador",
            "http://x/",
            "--json",
            "{}",
            "--form",
            "a=b",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "cargador",
            "http://x/",
            "--form",
            "a=b",
            "--file",
            "f=/tmp/x",
        ])
        .is_err());
    }

    #[test]
    fn test_method_arg_conversion() {
        assert_eq!(carga::HttpMethod::from(MethodArg::Delete), carga::HttpMethod::Delete);
        assert_eq!(carga::HttpMethod::from(MethodArg::Head), carga::HttpMethod::Head);
    }
}
