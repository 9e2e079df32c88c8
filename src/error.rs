//! Error types for LeadsDB API calls.
//!
//! Every fallible operation in this crate returns [`Error`]. Non-2xx responses are
//! carried as an [`ApiError`], which exposes the status code, the machine error code
//! and the human message sent by the server, and can be compared against an
//! [`ErrorKind`] without matching on message text.

use http::StatusCode;
use serde::Deserialize;
use std::fmt;

/// Broad categories of API failures, derived solely from the HTTP status code.
///
/// # Examples
///
/// ```
/// use leadsdb::{ApiError, ErrorKind};
/// use http::StatusCode;
///
/// let err = ApiError::new(StatusCode::NOT_FOUND, None, "lead not found");
/// assert_eq!(err.kind(), Some(ErrorKind::NotFound));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// HTTP 404.
    NotFound,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 429.
    RateLimited,
    /// HTTP 500.
    Internal,
}

impl ErrorKind {
    fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::NOT_FOUND => Some(ErrorKind::NotFound),
            StatusCode::UNAUTHORIZED => Some(ErrorKind::Unauthorized),
            StatusCode::FORBIDDEN => Some(ErrorKind::Forbidden),
            StatusCode::TOO_MANY_REQUESTS => Some(ErrorKind::RateLimited),
            StatusCode::INTERNAL_SERVER_ERROR => Some(ErrorKind::Internal),
            _ => None,
        }
    }
}

/// A structured error response from the LeadsDB API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// Machine readable error code, when the server sent one.
    pub code: Option<String>,
    /// Human readable message. Falls back to the status reason phrase.
    pub message: String,
    /// Seconds the server asked us to wait (`Retry-After` on 429 responses).
    pub retry_after: Option<u64>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Creates an error with an explicit message and no retry hint.
    pub fn new(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Builds an error from a non-2xx response body.
    ///
    /// The body is decoded best-effort as `{"code": .., "message": ..}`. Anything
    /// unparseable is ignored and the message falls back to the reason phrase.
    pub(crate) fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let parsed: ErrorBody = if body.is_empty() {
            ErrorBody::default()
        } else {
            serde_json::from_slice(body).unwrap_or_default()
        };

        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        Self {
            status,
            code: parsed.code.filter(|c| !c.is_empty()),
            message,
            retry_after: None,
        }
    }

    /// Returns the category of this error, if its status belongs to one.
    pub fn kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_status(self.status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(
                f,
                "leadsdb: {}: {} (status {})",
                code,
                self.message,
                self.status.as_u16()
            ),
            None => write!(f, "leadsdb: {} (status {})", self.message, self.status.as_u16()),
        }
    }
}

impl std::error::Error for ApiError {}

/// The main error type for LeadsDB API calls.
///
/// # Examples
///
/// ```no_run
/// use leadsdb::{Client, Error, ErrorKind};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key("secret").build()?;
///
/// match client.get_lead("lead_123").await {
///     Ok(lead) => println!("found {}", lead.name),
///     Err(e) if e.is(ErrorKind::NotFound) => println!("no such lead"),
///     Err(Error::Api(api)) => eprintln!("API error {}: {}", api.status, api.message),
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The caller supplied invalid input. Raised before any request is sent.
    #[error("leadsdb: {0}")]
    Validation(String),

    /// A network-level error occurred (connection refused, DNS failure, reset, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The server returned a non-2xx HTTP status code.
    #[error(transparent)]
    Api(ApiError),

    /// Failed to deserialize a successful response body into the expected type.
    ///
    /// Preserves the raw body and the serde message for debugging.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid client configuration (missing API key, bad header value, ...).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The operation was cancelled through the client's cancellation token.
    #[error("leadsdb: operation cancelled")]
    Cancelled,

    /// A single record of a bulk submission was rejected by the server.
    #[error("index {index}: {message}")]
    BatchItem {
        /// Position of the record inside its submitted batch
        index: usize,
        /// The server supplied reason
        message: String,
    },

    /// The server answered with a response that violates the API contract.
    #[error("leadsdb: protocol error: {0}")]
    Protocol(String),
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}

impl Error {
    /// Returns `true` if this error is potentially retryable.
    ///
    /// Transport failures (network errors, timeouts) are always retryable. API errors
    /// are retryable for 429, 500, 502, 503 and 504; every other status is terminal.
    ///
    /// # Examples
    ///
    /// ```
    /// use leadsdb::{ApiError, Error};
    /// use http::StatusCode;
    ///
    /// let err = Error::Api(ApiError::new(StatusCode::BAD_GATEWAY, None, "bad gateway"));
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Api(ApiError::new(StatusCode::CONFLICT, None, "conflict"));
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Timeout => true,
            Error::Api(api) => is_transient_status(api.status),
            Error::Validation(_)
            | Error::DeserializationFailed { .. }
            | Error::SerializationFailed(_)
            | Error::ConfigurationError(_)
            | Error::InvalidUrl(_)
            | Error::Cancelled
            | Error::BatchItem { .. }
            | Error::Protocol(_) => false,
        }
    }

    /// Returns `true` if this is an API error of the given category.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }

    /// Returns the category of this error, if it is an API error with a known status.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(api) => api.kind(),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(api) => Some(api.status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body of a failed deserialization.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the server requested delay in seconds, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::Api(api) => api.retry_after,
            _ => None,
        }
    }

    /// Returns `true` if this error came from cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Status codes worth another attempt: rate limiting and transient server failures.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// A specialized `Result` type for LeadsDB API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_json_body() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            br#"{"code":"invalid_input","message":"name is required"}"#,
        );
        assert_eq!(err.code.as_deref(), Some("invalid_input"));
        assert_eq!(err.message, "name is required");
        assert_eq!(
            err.to_string(),
            "leadsdb: invalid_input: name is required (status 400)"
        );
    }

    #[test]
    fn test_api_error_falls_back_to_reason_phrase() {
        let err = ApiError::from_body(StatusCode::SERVICE_UNAVAILABLE, b"<html>oops</html>");
        assert_eq!(err.code, None);
        assert_eq!(err.message, "Service Unavailable");
        assert_eq!(err.to_string(), "leadsdb: Service Unavailable (status 503)");

        let err = ApiError::from_body(StatusCode::NOT_FOUND, b"");
        assert_eq!(err.message, "Not Found");
    }

    #[test]
    fn test_kind_follows_status_only() {
        let cases = [
            (StatusCode::NOT_FOUND, Some(ErrorKind::NotFound)),
            (StatusCode::UNAUTHORIZED, Some(ErrorKind::Unauthorized)),
            (StatusCode::FORBIDDEN, Some(ErrorKind::Forbidden)),
            (StatusCode::TOO_MANY_REQUESTS, Some(ErrorKind::RateLimited)),
            (StatusCode::INTERNAL_SERVER_ERROR, Some(ErrorKind::Internal)),
            (StatusCode::BAD_GATEWAY, None),
            (StatusCode::BAD_REQUEST, None),
        ];

        for (status, kind) in cases {
            let err = Error::Api(ApiError::new(status, None, "forbidden"));
            assert_eq!(err.kind(), kind, "status {}", status);
        }

        assert!(Error::Api(ApiError::new(StatusCode::NOT_FOUND, None, "x")).is(ErrorKind::NotFound));
        assert!(!Error::Timeout.is(ErrorKind::NotFound));
    }

    #[test]
    fn test_retryable_classification() {
        for code in [429u16, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(Error::Api(ApiError::new(status, None, "")).is_retryable(), "{}", code);
        }
        for code in [400u16, 401, 403, 404, 409, 422, 501] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!Error::Api(ApiError::new(status, None, "")).is_retryable(), "{}", code);
        }
        assert!(Error::Timeout.is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::Validation("id is required".into()).is_retryable());
    }
}
