//! Request descriptors.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::fmt;

/// Everything needed to issue one logical request.
///
/// A descriptor is built once per operation and replayed unchanged on every
/// attempt. The JSON body is serialized at construction time so each retry sends
/// the exact same bytes.
///
/// # Examples
///
/// ```
/// use leadsdb::RequestDescriptor;
/// use http::Method;
///
/// let desc = RequestDescriptor::new(Method::GET, ["leads"])
///     .with_query_param("limit", "50")
///     .with_query_param("filter", "and.eq.city.Berlin")
///     .with_query_param("filter", "or.gte.rating.4");
///
/// assert_eq!(desc.path(), "/leads");
/// assert_eq!(desc.query_params().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestDescriptor {
    /// Creates a descriptor for `method` on the path made of `segments`.
    ///
    /// Segments are percent-encoded individually when the URL is built, so an id
    /// containing `/` or `?` cannot escape its position in the path.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Serializes `body` as JSON and attaches it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SerializationFailed`] if the value cannot be encoded.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> crate::Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Sets a header for this request, replacing any client default of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> crate::Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Appends a query parameter. Repeated keys are kept in insertion order.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends multiple query parameters.
    pub fn with_query_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw path segments, unencoded.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path relative to the base URL, for logging.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    /// Query parameters in insertion order.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Request specific headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The serialized body, if any. Cloning is a reference count bump.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}
