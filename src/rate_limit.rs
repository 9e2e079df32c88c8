//! Rate limit hint extraction.
//!
//! LeadsDB answers throttled requests with HTTP 429 and an integer `Retry-After`
//! header. The hint is only honored when it is a plain number of seconds.

use http::{HeaderMap, StatusCode};

/// Parses the retry-after hint (seconds) for a response.
///
/// Only 429 responses carry a hint. Non-numeric values, including HTTP dates, are
/// ignored and the caller falls back to exponential backoff.
///
/// # Examples
///
/// ```
/// use leadsdb::rate_limit::retry_after;
/// use http::{HeaderMap, StatusCode};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("retry-after", "7".parse().unwrap());
///
/// assert_eq!(retry_after(StatusCode::TOO_MANY_REQUESTS, &headers), Some(7));
/// assert_eq!(retry_after(StatusCode::SERVICE_UNAVAILABLE, &headers), None);
/// ```
pub fn retry_after(status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let header = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;
    header.trim().parse::<u64>().ok()
}
