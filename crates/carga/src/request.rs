//! One-time request template construction.
//!
//! The template is built once per run: headers are parsed, cookies joined,
//! and the body encoded into a single [`Bytes`] buffer. Workers then stamp
//! out per-attempt requests with zero-copy body clones.

use crate::config::{BenchmarkConfig, BodySource, FileField};
use crate::error::{CargaError, CargaResult};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::{Method, Url};
use uuid::Uuid;

/// Identifying tag sent with every attempt.
pub const USER_AGENT_TAG: &str = concat!("carga/", env!("CARGO_PKG_VERSION"), " (bench)");

/// Immutable blueprint for every request of a run.
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestTemplate {
    /// Build the template from a validated configuration.
    ///
    /// Unreadable attachments, invalid header names, and body encoding
    /// failures all surface here, before any worker starts.
    pub fn prepare(config: &BenchmarkConfig) -> CargaResult<Self> {
        let url = Url::parse(&config.url).map_err(|e| CargaError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

        let (body, body_content_type) = encode_body(&config.body)?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            headers.insert(parse_header_name(name)?, parse_header_value(name, value)?);
        }

        if !config.cookies.is_empty() {
            let joined = config
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(COOKIE, parse_header_value("cookie", &joined)?);
        }

        let content_type = config.content_type.clone().or(body_content_type);
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, parse_header_value("content-type", &ct)?);
        }
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_TAG));

        Ok(Self {
            method: config.method.into(),
            url,
            headers,
            body,
        })
    }

    /// Stamp out one request. The body clone is zero-copy.
    #[must_use]
    pub fn instantiate(&self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        if !self.body.is_empty() {
            *request.body_mut() = Some(reqwest::Body::from(self.body.clone()));
        }
        request
    }

    /// Header view, for tests and diagnostics.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Encoded body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Encode the configured body source once, returning the bytes and the
/// content type it implies.
fn encode_body(body: &BodySource) -> CargaResult<(Bytes, Option<String>)> {
    match body {
        BodySource::None => Ok((Bytes::new(), None)),
        BodySource::Json(raw) => Ok((
            Bytes::copy_from_slice(raw),
            Some("application/json".to_string()),
        )),
        BodySource::Form(fields) => {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            Ok((
                Bytes::from(encoded),
                Some("application/x-www-form-urlencoded".to_string()),
            ))
        }
        BodySource::Files(files) => encode_multipart(files),
    }
}

/// Encode a multipart/form-data body with a random boundary.
fn encode_multipart(files: &[FileField]) -> CargaResult<(Bytes, Option<String>)> {
    let boundary = format!("carga-{}", Uuid::new_v4().simple());
    let mut out = Vec::new();

    for file in files {
        let data = std::fs::read(&file.path)
            .map_err(|e| CargaError::attachment(file.path.clone(), e))?;
        let filename = file
            .path
            .file_name()
            .map_or_else(|| "file".to_string(), |n| n.to_string_lossy().into_owned());

        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        out.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n",
                file.field
            )
            .as_bytes(),
        );
        out.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        out.extend_from_slice(&data);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    Ok((
        Bytes::from(out),
        Some(format!("multipart/form-data; boundary={boundary}")),
    ))
}

fn parse_header_name(name: &str) -> CargaResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| CargaError::config(format!("invalid header name `{name}`")))
}

fn parse_header_value(name: &str, value: &str) -> CargaResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| CargaError::config(format!("invalid value for header `{name}`")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{BenchmarkConfig, HttpMethod};
    use std::io::Write;

    fn base_builder() -> crate::config::BenchmarkBuilder {
        BenchmarkConfig::builder(HttpMethod::Post, "http://localhost:9090/upload")
    }

    #[test]
    fn test_user_agent_always_present() {
        let config = base_builder().build().unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();
        assert_eq!(
            template.headers().get(USER_AGENT).unwrap().to_str().unwrap(),
            USER_AGENT_TAG
        );
        assert!(USER_AGENT_TAG.starts_with("carga/"));
    }

    #[test]
    fn test_cookies_join_into_one_header() {
        let config = base_builder()
            .cookie("session", "abc123")
            .cookie("theme", "dark")
            .build()
            .unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();
        assert_eq!(
            template.headers().get(COOKIE).unwrap().to_str().unwrap(),
            "session=abc123; theme=dark"
        );
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let config = base_builder()
            .json(serde_json::json!({"k": "v"}))
            .build()
            .unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();
        assert_eq!(
            template.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(template.body().as_ref(), br#"{"k":"v"}"#);
    }

    #[test]
    fn test_content_type_override_wins() {
        let config = base_builder()
            .json(serde_json::json!({}))
            .content_type("application/vnd.carga+json")
            .build()
            .unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();
        assert_eq!(
            template.headers().get(CONTENT_TYPE).unwrap(),
            "application/vnd.carga+json"
        );
    }

    #[test]
    fn test_form_body_urlencodes() {
        let config = base_builder()
            .form_field("name", "la carga")
            .form_field("n", "2")
            .build()
            .unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();
        assert_eq!(template.body().as_ref(), b"name=la+carga&n=2");
        assert_eq!(
            template.headers().get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_multipart_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"binary-data").unwrap();

        let config = base_builder().file("upload", &path).build().unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();

        let content_type = template
            .headers()
            .get(CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary=carga-"));

        let body = String::from_utf8_lossy(template.body());
        assert!(body.contains("Content-Disposition: form-data; name=\"upload\"; filename=\"payload.bin\""));
        assert!(body.contains("binary-data"));
        let boundary = content_type.split('=').nth(1).unwrap();
        assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_missing_attachment_is_fatal() {
        let config = base_builder()
            .file("upload", "/nonexistent/carga-missing.bin")
            .build()
            .unwrap();
        assert!(matches!(
            RequestTemplate::prepare(&config),
            Err(CargaError::Attachment { .. })
        ));
    }

    #[test]
    fn test_invalid_header_name_is_fatal() {
        let config = base_builder().header("bad header", "v").build().unwrap();
        assert!(matches!(
            RequestTemplate::prepare(&config),
            Err(CargaError::Config { .. })
        ));
    }

    #[test]
    fn test_instantiate_clones_are_independent() {
        let config = base_builder()
            .json(serde_json::json!({"k": "v"}))
            .build()
            .unwrap();
        let template = RequestTemplate::prepare(&config).unwrap();

        let first = template.instantiate();
        let second = template.instantiate();
        assert_eq!(first.method(), second.method());
        assert_eq!(first.url(), second.url());
        assert!(first.body().is_some());
    }
}
