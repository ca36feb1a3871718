//! Pluggable executor for `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only place the client performs I/O. The default
//! `ReqwestTransport` owns a `reqwest::Client`, so connection pooling,
//! timeouts and proxies are configured there rather than in the client.
//! Fakes implement the trait directly to script responses in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::BoxError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Failures a transport can report instead of a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout and the like.
    #[error("request failed: {0}")]
    Network(#[source] BoxError),

    /// Something came back, but it was not a usable HTTP response.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    pub fn network(err: impl Into<BoxError>) -> Self {
        TransportError::Network(err.into())
    }
}

/// Executes a single HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap a preconfigured client, e.g. one built with a timeout.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn response_is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(reqwest_method(request.method), request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::network)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // An error status is final whatever follows, so a body that fails to
        // arrive only matters on success.
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) if response_is_success(status) => return Err(TransportError::network(err)),
            Err(err) => {
                tracing::debug!(status, error = %err, "dropping unreadable error body");
                Vec::new()
            }
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
