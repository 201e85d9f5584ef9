//! Decoded responses together with the exchange they came from.
//!
//! [`Response`] carries the decoded data, the envelope counters and the
//! details of the HTTP exchange, including the raw body, for debugging.

use crate::decode::Decoded;
use crate::transport::HttpResponse;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful, decoded response.
///
/// # Examples
///
/// ```no_run
/// use mailjet::resources::Contact;
/// use mailjet::Client;
///
/// # async fn example() -> Result<(), mailjet::Error> {
/// let client = Client::new("public", "private")?;
///
/// let contacts = client.list::<Vec<Contact>>("contact", &[]).await?;
///
/// println!("{} of {} contacts", contacts.count, contacts.total);
/// for contact in contacts.iter() {
///     println!("{}", contact.email);
/// }
/// println!("Request took {:?} over {} attempt(s)", contacts.latency, contacts.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded data.
    pub data: T,

    /// Number of results in this page (`Count`); 0 when the body had no envelope.
    pub count: u64,

    /// Number of results across all pages (`Total`); 0 when the body had no envelope.
    pub total: u64,

    /// The raw response body.
    pub raw_body: String,

    pub status: StatusCode,

    pub headers: HeaderMap,

    /// Time from the first attempt until the final response was read.
    pub latency: Duration,

    /// Number of attempts made; `1` when the first one succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a response without envelope counters.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            count: 0,
            total: 0,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    pub(crate) fn from_exchange(
        decoded: Decoded<T>,
        response: HttpResponse,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        let raw_body = response.text();
        Self {
            data: decoded.data,
            count: decoded.count,
            total: decoded.total,
            raw_body,
            status: response.status,
            headers: response.headers,
            latency,
            attempts,
        }
    }

    /// Maps the data, keeping counters and exchange details.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mailjet::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     vec![1, 2, 3],
    ///     String::new(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(100),
    ///     1,
    /// );
    ///
    /// let first = response.map(|ids| ids[0]);
    /// assert_eq!(first.data, 1);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            count: self.count,
            total: self.total,
            raw_body: self.raw_body,
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

    /// A header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_from_exchange_keeps_counters_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let exchange = HttpResponse {
            status: StatusCode::OK,
            headers,
            body: br#"{"Count":1,"Data":[7],"Total":9}"#.to_vec(),
        };
        let decoded = Decoded {
            data: vec![7],
            count: 1,
            total: 9,
        };

        let response = Response::from_exchange(decoded, exchange, Duration::from_millis(5), 3);
        assert_eq!(response.count, 1);
        assert_eq!(response.total, 9);
        assert_eq!(response.raw_body, r#"{"Count":1,"Data":[7],"Total":9}"#);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(response.was_retried());
        assert_eq!(response.len(), 1);
        assert_eq!(response.into_data(), vec![7]);
    }
}
