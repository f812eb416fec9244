//! HTTP transport seam: one request, one response, fixed timeout.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use shared::domain::Method;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Request fields handed to the transport, detached from the history record.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// A completed HTTP exchange, body kept as raw text.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid request header '{name}'")]
    InvalidHeader { name: String },
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("exchange failed: {0}")]
    Protocol(String),
}

/// Single-attempt send capability. No retries; the per-request timeout is the
/// only cancellation point.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<Exchange, TransportError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TransportRequest) -> Result<Exchange, TransportError> {
        let mut builder = self
            .http
            .request(reqwest_method(request.method), request.url.as_str())
            .timeout(self.timeout);

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
            builder = builder.header(header_name, header_value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| classify(err, self.timeout))?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|err| classify(err, self.timeout))?;

        Ok(Exchange {
            status: status.as_u16(),
            reason,
            headers,
            body,
        })
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { timeout }
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() || err.is_request() {
        TransportError::BadRequest(err.to_string())
    } else {
        TransportError::Protocol(err.to_string())
    }
}
