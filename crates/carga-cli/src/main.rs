//! Cargador: command-line front end for the carga load-testing engine.
//!
//! ## Usage
//!
//! ```bash
//! cargador http://localhost:8080/            # 10 connections, 10 seconds
//! cargador http://localhost:8080/ -c 100 -d 30
//! cargador http://localhost:8080/api -X post --json '{"n":1}' -p 4
//! cargador http://localhost:8080/ -o result.json
//! ```

use clap::Parser;
use std::process::ExitCode;

mod commands;
mod error;
mod logging;

use commands::Cli;
use error::{CliError, CliResult};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", console::style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = build_config(&cli)?;
    if !cli.quiet {
        print!("{}", carga::report::render_banner(&config));
        println!();
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(carga::LoadRunner::new(config).run())?;

    if !cli.quiet {
        print!("{}", carga::report::render(&report));
    }
    if let Some(ref path) = cli.output {
        std::fs::write(path, carga::report::to_json(&report))?;
        if !cli.quiet {
            println!("\nReport written to {}", path.display());
        }
    }
    Ok(())
}

/// Translate parsed flags into a validated benchmark configuration.
fn build_config(cli: &Cli) -> CliResult<carga::BenchmarkConfig> {
    let mut builder = carga::BenchmarkConfig::builder(cli.method.into(), &cli.url)
        .concurrency(cli.connections)
        .duration_secs(cli.duration)
        .pipeline(cli.pipeline)
        .timeout_secs(cli.timeout);

    for header in &cli.headers {
        let (name, value) = split_pair(header, ':', "header", "name: value")?;
        builder = builder.header(name, value);
    }
    for cookie in &cli.cookies {
        let (name, value) = split_pair(cookie, '=', "cookie", "name=value")?;
        builder = builder.cookie(name, value);
    }
    if let Some(ref content_type) = cli.content_type {
        builder = builder.content_type(content_type);
    }

    if let Some(ref json) = cli.json {
        builder = builder.json(parse_json_arg(json)?);
    }
    for field in &cli.forms {
        let (key, value) = split_pair(field, '=', "form field", "key=value")?;
        builder = builder.form_field(key, value);
    }
    for file in &cli.files {
        let (field, path) = split_pair(file, '=', "file attachment", "field=path")?;
        builder = builder.file(field, path);
    }

    Ok(builder.build()?)
}

/// Split a `name<sep>value` argument, trimming whitespace around both parts.
fn split_pair(
    raw: &str,
    sep: char,
    what: &str,
    expected: &str,
) -> CliResult<(String, String)> {
    raw.split_once(sep)
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| {
            CliError::invalid_argument(format!("bad {what} `{raw}`: expected `{expected}`"))
        })
}

/// An inline JSON value, or `@path` to load one from disk.
fn parse_json_arg(raw: &str) -> CliResult<serde_json::Value> {
    let text = if let Some(path) = raw.strip_prefix('@') {
        std::fs::read_to_string(path)?
    } else {
        raw.to_string()
    };
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pair_trims() {
        let (name, value) = split_pair("accept: text/html", ':', "header", "name: value").unwrap();
        assert_eq!(name, "accept");
        assert_eq!(value, "text/html");
    }

    #[test]
    fn test_split_pair_rejects_missing_separator() {
        assert!(split_pair("no-separator", ':', "header", "name: value").is_err());
    }

    #[test]
    fn test_split_pair_rejects_empty_name() {
        assert!(split_pair("=value", '=', "cookie", "name=value").is_err());
    }

    #[test]
    fn test_parse_json_arg_inline() {
        let value = parse_json_arg(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_json_arg_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, r#"{"from": "file"}"#).unwrap();

        let value = parse_json_arg(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["from"], "file");
    }

    #[test]
    fn test_parse_json_arg_rejects_garbage() {
        assert!(parse_json_arg("not json").is_err());
    }

    #[test]
    fn test_build_config_maps_flags() {
        let cli = Cli::try_parse_from([
            "cargador",
            "http://localhost:8080/",
            "-X",
            "post",
            "-H",
            "x-bench: 1",
            "--cookie",
            "session=abc",
            "--form",
            "name=value",
            "-c",
            "3",
            "-d",
            "7",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.method, carga::HttpMethod::Post);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.duration_secs, 7);
        assert_eq!(config.headers, vec![("x-bench".to_string(), "1".to_string())]);
        assert_eq!(
            config.body,
            carga::BodySource::Form(vec![("name".to_string(), "value".to_string())])
        );
    }

    #[test]
    fn test_build_config_rejects_zero_connections() {
        let cli = Cli::try_parse_from(["cargador", "http://localhost/", "-c", "0"]).unwrap();
        assert!(build_config(&cli).is_err());
    }
}
