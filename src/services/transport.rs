//! HTTP transport used by the publisher.
//!
//! The publisher never talks to `reqwest` directly: it builds `HttpRequest`
//! values and hands them to a `Transport`. `ReqwestTransport` is the real
//! implementation; tests substitute their own.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use hyper::ext::ReasonPhrase;
use reqwest::{Client, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

/// A fully described outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Raw body sent as `application/octet-stream`.
    pub fn bytes(self, body: impl Into<Bytes>) -> Self {
        let mut request = self.header(header::CONTENT_TYPE.as_str(), "application/octet-stream");
        request.body = Some(body.into());
        request
    }

    /// JSON body with a matching `Content-Type`.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> serde_json::Result<Self> {
        let encoded = serde_json::to_vec(body)?;
        let mut request = self.header(header::CONTENT_TYPE.as_str(), "application/json");
        request.body = Some(Bytes::from(encoded));
        Ok(request)
    }

    /// First value of a header, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status line and body of a response.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Reason phrase, e.g. `Not Found`.
    pub status_text: String,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends one request and returns the response, whatever its status.
///
/// Errors are reserved for requests that never produced a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).send(request).await
    }
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zenodo-publish/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.context("Failed to send request")?;
        let status = response.status();
        let status_text = reason_phrase(status, response.extensions().get::<ReasonPhrase>());
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}

/// The server's own reason phrase when it sent a non-canonical one, else the canonical one.
fn reason_phrase(status: StatusCode, sent: Option<&ReasonPhrase>) -> String {
    sent.and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .or_else(|| status.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_sets_content_type() {
        let request = HttpRequest::put("https://example.org/x")
            .json(&serde_json::json!({"a": 1}))
            .unwrap();
        assert_eq!(request.header_value("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(&b"{\"a\":1}"[..]));
    }

    #[test]
    fn unknown_status_falls_back_to_code() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(reason_phrase(status, None), "599");
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND, None), "Not Found");
    }

    #[test]
    fn server_reason_phrase_wins_over_canonical() {
        let sent = ReasonPhrase::from_static(b"Not found");
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND, Some(&sent)), "Not found");
    }
}
