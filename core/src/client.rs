//! Async client for the expense API.
//!
//! # Design
//! `ShishutsukanClient` holds a base URL and a shared `Transport`, neither of
//! which changes after construction, so the client is `Clone + Send + Sync`
//! without any locking. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the async method only runs the transport in between.
//! Nothing is cached: every call is exactly one request.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Result, ShishutsukanError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport, TransportError};
use crate::types::{ApiMessage, Expense, ExpenseWithId, Genre, GenreWithId};

const EXPENSES: &str = "expenses";
const GENRES: &str = "genres";

/// Client for the expense API.
#[derive(Clone)]
pub struct ShishutsukanClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ShishutsukanClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShishutsukanClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ShishutsukanClient {
    /// Client using the default reqwest transport.
    ///
    /// `base_url` is taken as is. A URL that cannot carry path segments
    /// (`mailto:`, `data:`) is not rejected here; every request built from it
    /// fails with `InvalidUrl`. Use `parse_base_url` to check a URL up front.
    pub fn new(base_url: Url) -> Self {
        Self::with_transport(base_url, Arc::new(ReqwestTransport::default()))
    }

    /// Client using `transport`. `base_url` is taken as is, see `new`.
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    /// Parse `base_url` and build a client with the default transport.
    pub fn from_url_str(base_url: &str) -> Result<Self> {
        Ok(Self::new(Self::parse_base_url(base_url)?))
    }

    /// Validate a base URL string: it must be absolute and able to carry path
    /// segments.
    pub fn parse_base_url(base_url: &str) -> Result<Url> {
        let url = Url::parse(base_url).map_err(|_| ShishutsukanError::InvalidUrl)?;
        if url.cannot_be_a_base() {
            return Err(ShishutsukanError::InvalidUrl);
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // -- expenses ----------------------------------------------------------

    pub async fn add_expense(&self, expense: &Expense) -> Result<ApiMessage> {
        let response = self.send(self.build_add_expense(expense)?).await?;
        self.parse_add_expense(response)
    }

    pub async fn get_expenses(&self) -> Result<Vec<ExpenseWithId>> {
        let response = self.send(self.build_get_expenses()?).await?;
        self.parse_get_expenses(response)
    }

    /// Delete an expense. The server reports success for unknown ids too.
    pub async fn delete_expense(&self, id: i64) -> Result<ApiMessage> {
        let response = self.send(self.build_delete_expense(id)?).await?;
        self.parse_delete_expense(response)
    }

    // -- genres ------------------------------------------------------------

    pub async fn get_genres(&self) -> Result<Vec<GenreWithId>> {
        let response = self.send(self.build_get_genres()?).await?;
        self.parse_get_genres(response)
    }

    /// Add a genre. Duplicate names come back as `ServerError`.
    pub async fn add_genre(&self, genre: &Genre) -> Result<ApiMessage> {
        let response = self.send(self.build_add_genre(genre)?).await?;
        self.parse_add_genre(response)
    }

    /// Delete a genre. Genres still referenced by expenses come back as
    /// `ServerError`.
    pub async fn delete_genre(&self, id: i64) -> Result<ApiMessage> {
        let response = self.send(self.build_delete_genre(id)?).await?;
        self.parse_delete_genre(response)
    }

    // -- request builders --------------------------------------------------

    pub fn build_add_expense(&self, expense: &Expense) -> Result<HttpRequest> {
        self.json_request(HttpMethod::Post, &[EXPENSES], expense)
    }

    pub fn build_get_expenses(&self) -> Result<HttpRequest> {
        self.bare_request(HttpMethod::Get, &[EXPENSES])
    }

    pub fn build_delete_expense(&self, id: i64) -> Result<HttpRequest> {
        self.bare_request(HttpMethod::Delete, &[EXPENSES, id.to_string().as_str()])
    }

    pub fn build_get_genres(&self) -> Result<HttpRequest> {
        self.bare_request(HttpMethod::Get, &[GENRES])
    }

    pub fn build_add_genre(&self, genre: &Genre) -> Result<HttpRequest> {
        self.json_request(HttpMethod::Post, &[GENRES], genre)
    }

    pub fn build_delete_genre(&self, id: i64) -> Result<HttpRequest> {
        self.bare_request(HttpMethod::Delete, &[GENRES, id.to_string().as_str()])
    }

    // -- response parsers --------------------------------------------------

    pub fn parse_add_expense(&self, response: HttpResponse) -> Result<ApiMessage> {
        parse_envelope(response)
    }

    pub fn parse_get_expenses(&self, response: HttpResponse) -> Result<Vec<ExpenseWithId>> {
        parse_json(response)
    }

    pub fn parse_delete_expense(&self, response: HttpResponse) -> Result<ApiMessage> {
        parse_envelope(response)
    }

    pub fn parse_get_genres(&self, response: HttpResponse) -> Result<Vec<GenreWithId>> {
        parse_json(response)
    }

    pub fn parse_add_genre(&self, response: HttpResponse) -> Result<ApiMessage> {
        parse_envelope(response)
    }

    pub fn parse_delete_genre(&self, response: HttpResponse) -> Result<ApiMessage> {
        parse_envelope(response)
    }

    // -- internals ---------------------------------------------------------

    /// Append `segments` to the base URL's path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ShishutsukanError::InvalidUrl)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn bare_request(&self, method: HttpMethod, segments: &[&str]) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method,
            url: self.endpoint(segments)?,
            headers: Vec::new(),
            body: None,
        })
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        segments: &[&str],
        payload: &T,
    ) -> Result<HttpRequest> {
        let body = serde_json::to_string(payload).map_err(ShishutsukanError::EncodingError)?;
        Ok(HttpRequest {
            method,
            url: self.endpoint(segments)?,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|err| match err {
                TransportError::Network(cause) => ShishutsukanError::NetworkError(cause),
                TransportError::Malformed(_) => ShishutsukanError::InvalidResponse,
            })?;
        tracing::debug!(status = response.status, "received response");
        tracing::trace!(bytes = response.body.len(), "response body");
        Ok(response)
    }
}

/// Reject anything that is not a 2xx response before the body is touched.
fn validate_response(response: &HttpResponse) -> Result<()> {
    if !(100..=599).contains(&response.status) {
        return Err(ShishutsukanError::InvalidResponse);
    }
    if !(200..=299).contains(&response.status) {
        return Err(ShishutsukanError::HttpError {
            status_code: response.status,
        });
    }
    Ok(())
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    validate_response(&response)?;
    serde_json::from_slice(&response.body).map_err(ShishutsukanError::DecodingError)
}

/// Decode an `ApiMessage`; a populated `error` wins over a 2xx status.
fn parse_envelope(response: HttpResponse) -> Result<ApiMessage> {
    let message: ApiMessage = parse_json(response)?;
    match message.error {
        Some(error) => Err(ShishutsukanError::ServerError(error)),
        None => Ok(message),
    }
}
