//! Response wrapper carrying decoded data plus transport metadata.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful response from the executor.
///
/// `data` is the decoded body, or `T::default()` when the server answered 2xx with
/// an empty body.
///
/// # Examples
///
/// ```no_run
/// use leadsdb::{Client, Lead, RequestDescriptor};
/// use http::Method;
///
/// # async fn example() -> Result<(), leadsdb::Error> {
/// let client = Client::builder().api_key("secret").build()?;
///
/// let response = client
///     .call::<Lead>(RequestDescriptor::new(Method::GET, ["leads", "lead_1"]))
///     .await?;
///
/// println!("{} after {} attempt(s) in {:?}", response.name, response.attempts, response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response data.
    pub data: T,

    /// The HTTP status code of the final attempt.
    pub status: StatusCode,

    /// The response headers of the final attempt.
    pub headers: HeaderMap,

    /// Time from the first attempt until the response was fully read, backoff included.
    pub latency: Duration,

    /// Number of attempts it took. `1` when no retry happened.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Maps the response data while keeping the metadata.
    ///
    /// ```
    /// # use leadsdb::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response {
    ///     data: vec![1, 2, 3],
    ///     status: StatusCode::OK,
    ///     headers: HeaderMap::new(),
    ///     latency: Duration::from_millis(12),
    ///     attempts: 1,
    /// };
    ///
    /// assert_eq!(response.map(|v| v.len()).data, 3);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Discards the metadata.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
