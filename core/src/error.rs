//! Error types for the expense API client.
//!
//! # Design
//! Every failure is classified and handed back to the caller; the client
//! never retries or logs them. Status failures carry only the code because
//! the body of a non-2xx response is never decoded. Application-level
//! rejections arrive inside a 2xx envelope and surface as `ServerError`.

use thiserror::Error;

/// Boxed cause for failures raised by a transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = ShishutsukanError> = std::result::Result<T, E>;

/// Errors returned by `ShishutsukanClient`.
#[derive(Debug, Error)]
pub enum ShishutsukanError {
    /// The base URL string is not an absolute URL that can carry a path.
    #[error("invalid base URL")]
    InvalidUrl,

    /// The transport did not produce a well-formed HTTP response.
    #[error("invalid response")]
    InvalidResponse,

    /// The server answered with a status outside 200..=299.
    #[error("HTTP error: {status_code}")]
    HttpError { status_code: u16 },

    /// The response body did not match the expected JSON shape.
    #[error("decoding error: {0}")]
    DecodingError(#[source] serde_json::Error),

    /// The transport failed before a response arrived.
    #[error("network error: {0}")]
    NetworkError(#[source] BoxError),

    /// The server accepted the request but reported a failure in the envelope.
    #[error("server error: {0}")]
    ServerError(String),

    /// The request payload could not be serialized to JSON.
    #[error("encoding error: {0}")]
    EncodingError(#[source] serde_json::Error),
}

impl ShishutsukanError {
    /// The HTTP status carried by an `HttpError`, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ShishutsukanError::HttpError { status_code } => Some(*status_code),
            _ => None,
        }
    }
}
