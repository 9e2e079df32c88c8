//! LeadsDB client with retry logic and rich error handling.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to configure
//! and create clients. Every call goes through the same executor: the request
//! descriptor is replayed on transient failures with exponential backoff, and every
//! network round trip and backoff wait races the client's cancellation token.

use crate::{
    descriptor::RequestDescriptor,
    error::ApiError,
    model::{
        BulkCreateRequest, BulkCreateResult, ExportFormat, Lead, Note, NoteContent, UpdateLead,
    },
    rate_limit,
    retry::{Backoff, RetryOnTransient, RetryPredicate},
    Error, Response, Result,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://getleadsdb.com/api/v1";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of attempts per logical operation.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Maximum number of leads accepted by one bulk create call.
pub const MAX_BATCH_SIZE: usize = 100;

/// Environment variable holding the API key, read by [`ClientBuilder::from_env`].
pub const API_KEY_ENV: &str = "LEADSDB_API_KEY";

/// Environment variable overriding the base URL, read by [`ClientBuilder::from_env`].
pub const BASE_URL_ENV: &str = "LEADSDB_BASE_URL";

const API_KEY_HEADER: &str = "x-api-key";

/// A stream of raw body chunks, as returned by [`Client::export`].
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A LeadsDB API client.
///
/// The client is cheap to clone and designed to be reused: clones share one
/// connection pool and one configuration.
///
/// # Examples
///
/// ```no_run
/// use leadsdb::{Client, Lead};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), leadsdb::Error> {
/// let client = Client::builder()
///     .api_key("secret")
///     .timeout(Duration::from_secs(30))
///     .max_retries(5)
///     .build()?;
///
/// let created = client.create_lead(&Lead::new("Acme Corporation", "website")).await?;
/// let fetched = client.get_lead(&created.id).await?;
/// println!("{} ({})", fetched.name, fetched.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    max_retries: usize,
    backoff: Backoff,
    retry_predicate: Box<dyn RetryPredicate>,
    timeout: Option<Duration>,
}

/// What one network round trip produced.
#[derive(Debug)]
pub(crate) enum AttemptOutcome<T> {
    Success(T),
    Retriable(Error),
    Fatal(Error),
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns a client sharing this one's connection pool and configuration, whose
    /// operations are cancelled when `token` fires.
    ///
    /// Background operations started from the returned client ([`Client::leads_outlets`],
    /// [`Client::bulk_create_stream`]) stop and close their outlets on cancellation.
    ///
    /// ```no_run
    /// use leadsdb::Client;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), leadsdb::Error> {
    /// let client = Client::builder().api_key("secret").build()?;
    /// let shutdown = CancellationToken::new();
    /// let scoped = client.with_cancellation(shutdown.child_token());
    ///
    /// shutdown.cancel();
    /// assert!(scoped.get_lead("lead_1").await.unwrap_err().is_cancelled());
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_cancellation(&self, token: CancellationToken) -> Client {
        Client {
            inner: Arc::clone(&self.inner),
            cancel: token,
        }
    }

    /// The token that cancels this client's operations.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Executes a descriptor and decodes the JSON body into `Res`.
    ///
    /// A 2xx response with an empty body yields `Res::default()`.
    ///
    /// # Errors
    ///
    /// Returns the last observed error once retries are exhausted, or the first
    /// non-retryable one. Decode failures surface as
    /// [`Error::DeserializationFailed`] and are never retried.
    pub async fn call<Res>(&self, descriptor: RequestDescriptor) -> Result<Response<Res>>
    where
        Res: DeserializeOwned + Default,
    {
        let response = self.send(descriptor).await?;
        let status = response.status;

        if response.data.is_empty() {
            return Ok(response.map(|_| Res::default()));
        }

        match serde_json::from_slice::<Res>(&response.data) {
            Ok(data) => Ok(Response {
                data,
                status,
                headers: response.headers,
                latency: response.latency,
                attempts: response.attempts,
            }),
            Err(e) => {
                let raw_response = String::from_utf8_lossy(&response.data).into_owned();
                tracing::error!(
                    error = %e,
                    raw_response = %raw_response,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }

    /// Executes a descriptor and returns the raw body, fully read.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Response<Bytes>> {
        let start_time = Instant::now();
        let (response, attempts) = self.execute(&descriptor).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = self.read_body(response).await?;
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            attempts = attempts,
            "Received HTTP response"
        );

        Ok(Response {
            data: body,
            status,
            headers,
            latency,
            attempts,
        })
    }

    /// Runs the retry loop until an attempt returns 2xx, a terminal error occurs,
    /// or attempts run out. Returns the successful response (body unread) and the
    /// number of attempts made.
    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<(reqwest::Response, usize)> {
        let max_attempts = self.inner.max_retries.max(1);
        let mut attempt: usize = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let error = match self.attempt(descriptor, attempt).await {
                AttemptOutcome::Success(response) => return Ok((response, attempt + 1)),
                AttemptOutcome::Fatal(e) => return Err(e),
                AttemptOutcome::Retriable(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                method = %descriptor.method(),
                path = %descriptor.path(),
                "Request failed"
            );

            if attempt + 1 >= max_attempts {
                return Err(error);
            }

            let backoff_attempt = u32::try_from(attempt).unwrap_or(u32::MAX);
            if !self
                .inner
                .backoff
                .wait(backoff_attempt, error.retry_after(), &self.cancel)
                .await
            {
                return Err(Error::Cancelled);
            }

            attempt += 1;
        }
    }

    /// Performs a single round trip and classifies the result.
    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        attempt: usize,
    ) -> AttemptOutcome<reqwest::Response> {
        let request = match self.build_request(descriptor, attempt) {
            Ok(request) => request,
            Err(e) => return AttemptOutcome::Fatal(e),
        };

        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return AttemptOutcome::Fatal(Error::Cancelled),
            sent = request.send() => sent,
        };

        let response = match sent {
            Ok(response) => response,
            Err(e) => return self.classify(transport_error(e)),
        };

        let status = response.status();
        if status.is_success() {
            return AttemptOutcome::Success(response);
        }

        let headers = response.headers().clone();
        let body = match self.read_body(response).await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::Fatal(e),
        };

        let mut api_error = ApiError::from_body(status, &body);
        api_error.retry_after = rate_limit::retry_after(status, &headers);

        if status.is_client_error() {
            tracing::error!(
                status = status.as_u16(),
                code = ?api_error.code,
                message = %api_error.message,
                retry_after = ?api_error.retry_after,
                "Client error (4xx)"
            );
        } else {
            tracing::warn!(
                status = status.as_u16(),
                code = ?api_error.code,
                message = %api_error.message,
                "Server error"
            );
        }

        self.classify(Error::Api(api_error))
    }

    fn classify<T>(&self, error: Error) -> AttemptOutcome<T> {
        if self.inner.retry_predicate.should_retry(&error) {
            AttemptOutcome::Retriable(error)
        } else {
            AttemptOutcome::Fatal(error)
        }
    }

    fn build_request(
        &self,
        descriptor: &RequestDescriptor,
        attempt: usize,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.url_for(descriptor)?;

        tracing::debug!(
            method = %descriptor.method(),
            url = %url,
            attempt = attempt,
            "Executing HTTP request"
        );

        let mut request = self
            .inner
            .http_client
            .request(descriptor.method().clone(), url)
            .headers(self.inner.default_headers.clone())
            .headers(descriptor.headers().clone());

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = descriptor.body() {
            request = request.body(body.clone());
        }

        Ok(request)
    }

    fn url_for(&self, descriptor: &RequestDescriptor) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::ConfigurationError("Base URL cannot carry a path".to_string())
            })?;
            segments.pop_if_empty();
            segments.extend(descriptor.segments());
        }

        if !descriptor.query_params().is_empty() {
            url.query_pairs_mut().extend_pairs(
                descriptor
                    .query_params()
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }

        Ok(url)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            body = response.bytes() => body.map_err(transport_error),
        }
    }

    /// Retrieves a lead by id.
    pub async fn get_lead(&self, id: &str) -> Result<Lead> {
        require(id, "id")?;
        let descriptor = RequestDescriptor::new(Method::GET, ["leads", id]);
        Ok(self.call::<Lead>(descriptor).await?.into_data())
    }

    /// Creates a lead. `name` and `source` are required.
    pub async fn create_lead(&self, lead: &Lead) -> Result<Lead> {
        lead.validate_for_create()
            .map_err(|reason| Error::Validation(reason.to_string()))?;
        let descriptor = RequestDescriptor::new(Method::POST, ["leads"]).with_json(lead)?;
        Ok(self.call::<Lead>(descriptor).await?.into_data())
    }

    /// Partially updates a lead.
    pub async fn update_lead(&self, id: &str, update: &UpdateLead) -> Result<Lead> {
        require(id, "id")?;
        let descriptor = RequestDescriptor::new(Method::PATCH, ["leads", id]).with_json(update)?;
        Ok(self.call::<Lead>(descriptor).await?.into_data())
    }

    /// Deletes a lead.
    pub async fn delete_lead(&self, id: &str) -> Result<()> {
        require(id, "id")?;
        self.send(RequestDescriptor::new(Method::DELETE, ["leads", id]))
            .await?;
        Ok(())
    }

    /// Adds a note to a lead.
    pub async fn create_note(&self, lead_id: &str, content: &str) -> Result<Note> {
        require(lead_id, "lead id")?;
        require(content, "content")?;
        let descriptor = RequestDescriptor::new(Method::POST, ["leads", lead_id, "notes"])
            .with_json(&NoteContent { content })?;
        Ok(self.call::<Note>(descriptor).await?.into_data())
    }

    /// Lists every note of a lead.
    pub async fn list_notes(&self, lead_id: &str) -> Result<Vec<Note>> {
        require(lead_id, "lead id")?;
        let descriptor = RequestDescriptor::new(Method::GET, ["leads", lead_id, "notes"]);
        Ok(self.call::<Vec<Note>>(descriptor).await?.into_data())
    }

    /// Replaces the content of a note.
    pub async fn update_note(&self, note_id: &str, content: &str) -> Result<Note> {
        require(note_id, "note id")?;
        require(content, "content")?;
        let descriptor = RequestDescriptor::new(Method::PUT, ["leads", "notes", note_id])
            .with_json(&NoteContent { content })?;
        Ok(self.call::<Note>(descriptor).await?.into_data())
    }

    /// Deletes a note.
    pub async fn delete_note(&self, note_id: &str) -> Result<()> {
        require(note_id, "note id")?;
        self.send(RequestDescriptor::new(
            Method::DELETE,
            ["leads", "notes", note_id],
        ))
        .await?;
        Ok(())
    }

    /// Creates up to [`MAX_BATCH_SIZE`] leads in one request.
    ///
    /// Every lead needs a `name` and a `source`; the whole call is rejected before
    /// anything is sent otherwise.
    ///
    /// # Errors
    ///
    /// Besides transport and API errors, returns [`Error::Protocol`] when the number
    /// of created plus rejected entries in the response differs from the number of
    /// leads submitted.
    pub async fn bulk_create(&self, leads: &[Lead]) -> Result<BulkCreateResult> {
        if leads.is_empty() {
            return Err(Error::Validation("leads is required".to_string()));
        }
        if leads.len() > MAX_BATCH_SIZE {
            return Err(Error::Validation(format!(
                "maximum {} leads allowed",
                MAX_BATCH_SIZE
            )));
        }
        for (index, lead) in leads.iter().enumerate() {
            lead.validate_for_create().map_err(|reason| {
                Error::Validation(format!("lead at index {}: {}", index, reason))
            })?;
        }

        let descriptor = RequestDescriptor::new(Method::POST, ["leads", "batch"])
            .with_json(&BulkCreateRequest { leads })?;
        let result = self.call::<BulkCreateResult>(descriptor).await?.into_data();

        let reported = result.created.len() + result.errors.len();
        if reported != leads.len() {
            return Err(Error::Protocol(format!(
                "bulk create reported {} outcomes for {} leads",
                reported,
                leads.len()
            )));
        }

        Ok(result)
    }

    /// Exports every lead in `format`, streaming the body.
    ///
    /// The request itself is retried like any other call. Once the body starts
    /// streaming, chunks stop when the client is cancelled.
    ///
    /// ```no_run
    /// use futures::StreamExt;
    /// use leadsdb::{Client, ExportFormat};
    ///
    /// # async fn example() -> Result<(), leadsdb::Error> {
    /// let client = Client::builder().api_key("secret").build()?;
    /// let mut export = client.export(ExportFormat::Csv).await?;
    ///
    /// while let Some(chunk) = export.next().await {
    ///     let chunk = chunk?;
    ///     println!("{} bytes", chunk.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn export(&self, format: ExportFormat) -> Result<ByteStream> {
        let descriptor = RequestDescriptor::new(Method::POST, ["leads", "export"])
            .with_query_param("format", format.as_str())
            .with_header(header::ACCEPT.as_str(), "*/*")?;

        let (response, attempts) = self.execute(&descriptor).await?;

        tracing::info!(
            status = response.status().as_u16(),
            attempts = attempts,
            format = format.as_str(),
            "Streaming export"
        );

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(transport_error))
            .take_until(self.cancel.clone().cancelled_owned());

        Ok(Box::pin(stream))
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(e)
    }
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{} is required", what)));
    }
    Ok(())
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use leadsdb::{retry::Backoff, ClientBuilder};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), leadsdb::Error> {
/// let client = ClientBuilder::new()
///     .api_key("secret")
///     .base_url("https://leads.internal.example/api/v1")?
///     .timeout(Duration::from_secs(30))
///     .max_retries(5)
///     .backoff(Backoff {
///         base_delay: Duration::from_millis(250),
///         max_jitter: Duration::from_millis(100),
///     })
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: Option<Url>,
    default_headers: HeaderMap,
    max_retries: usize,
    backoff: Backoff,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_headers: HeaderMap::new(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::default(),
            retry_predicate: None,
            timeout: Some(DEFAULT_TIMEOUT),
            http_client: None,
        }
    }

    /// Creates a builder from `LEADSDB_API_KEY` and, if set, `LEADSDB_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the base URL is invalid.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            Error::ConfigurationError(format!("{} environment variable is required", API_KEY_ENV))
        })?;

        let builder = Self::new().api_key(api_key);
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => builder.base_url(url),
            _ => Ok(builder),
        }
    }

    /// Sets the API key sent in the `X-API-Key` header.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL for all requests. Defaults to [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the total number of attempts per operation. Values below 1 mean 1.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff policy between attempts.
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default, requests are retried based on `Error::is_retryable()`.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-attempt request timeout. Defaults to [`DEFAULT_TIMEOUT`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses an existing `reqwest::Client`, sharing its connection pool.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was provided or if the client
    /// configuration is invalid.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::ConfigurationError("API key is required".to_string()))?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let mut key_value = HeaderValue::try_from(api_key)
            .map_err(|e| Error::ConfigurationError(format!("Invalid API key: {}", e)))?;
        key_value.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(HeaderName::from_static(API_KEY_HEADER), key_value);
        default_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        default_headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.extend(self.default_headers);

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnTransient));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers,
                max_retries: self.max_retries,
                backoff: self.backoff,
                retry_predicate,
                timeout: self.timeout,
            }),
            cancel: CancellationToken::new(),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::builder()
            .api_key("key")
            .base_url(base)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_url_keeps_base_path_and_encodes_segments() {
        let client = client("https://example.com/api/v1");
        let desc = RequestDescriptor::new(Method::GET, ["leads", "a/b c"])
            .with_query_param("filter", "and.eq.city.São Paulo");

        let url = client.url_for(&desc).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/v1/leads/a%2Fb%20c?filter=and.eq.city.S%C3%A3o+Paulo"
        );
    }

    #[test]
    fn test_url_with_trailing_slash_base() {
        let client = client("http://127.0.0.1:8080/");
        let desc = RequestDescriptor::new(Method::GET, ["leads"]);
        assert_eq!(client.url_for(&desc).unwrap().as_str(), "http://127.0.0.1:8080/leads");
    }

    #[test]
    fn test_build_requires_api_key() {
        assert!(matches!(
            Client::builder().build(),
            Err(Error::ConfigurationError(_))
        ));
        assert!(matches!(
            Client::builder().api_key("").build(),
            Err(Error::ConfigurationError(_))
        ));
    }

    // The only test touching these variables, so it cannot race another one.
    #[test]
    fn test_builder_from_env() {
        std::env::remove_var(API_KEY_ENV);
        assert!(matches!(
            ClientBuilder::from_env(),
            Err(Error::ConfigurationError(_))
        ));

        std::env::set_var(API_KEY_ENV, "env-key");
        std::env::set_var(BASE_URL_ENV, "http://localhost:9000/api/v1");
        let client = ClientBuilder::from_env().unwrap().build().unwrap();
        assert_eq!(client.inner.base_url.as_str(), "http://localhost:9000/api/v1");
        assert_eq!(client.inner.default_headers.get("x-api-key").unwrap(), "env-key");

        std::env::set_var(BASE_URL_ENV, "not a url");
        assert!(matches!(
            ClientBuilder::from_env(),
            Err(Error::InvalidUrl(_))
        ));

        std::env::remove_var(API_KEY_ENV);
        std::env::remove_var(BASE_URL_ENV);
    }

    #[test]
    fn test_default_headers_are_set() {
        let client = client("https://example.com");
        let headers = &client.inner.default_headers;
        assert_eq!(headers.get("x-api-key").unwrap(), "key");
        assert!(headers.get("x-api-key").unwrap().is_sensitive());
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("accept").unwrap(), "application/json");
    }
}
