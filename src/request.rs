//! Request construction and request modifiers.
//!
//! [`create_request`] turns a method, a URL and a payload into an
//! [`HttpRequest`], applying any [`RequestOption`]s the caller passed
//! (query filters, sort order, custom headers).

use crate::payload::{encode, Payload};
use crate::transport::HttpRequest;
use crate::{Error, Result};
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// `User-Agent` sent with every request: `<name>/<version>;<os>-<arch>`.
pub fn user_agent() -> String {
    format!(
        "{}/{};{}-{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

/// A modification applied to a request before it is sent.
///
/// # Examples
///
/// ```
/// use mailjet::request::{filter, sort, RequestOption, SortOrder};
///
/// let options = [
///     filter("ContactsList", "42"),
///     sort("CreatedAt", SortOrder::Descending),
///     RequestOption::custom(|request| {
///         request.headers.insert("x-trace", "on".parse().unwrap());
///     }),
/// ];
/// # let _ = options;
/// ```
#[derive(Clone)]
pub struct RequestOption(Arc<dyn Fn(&mut HttpRequest) + Send + Sync>);

impl RequestOption {
    /// Wraps an arbitrary request mutation.
    pub fn custom(f: impl Fn(&mut HttpRequest) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn apply(&self, request: &mut HttpRequest) {
        (self.0)(request)
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestOption(..)")
    }
}

/// Adds `key=value` to the query string.
///
/// The query is re-encoded so that a literal `+` reaches the server as `+`
/// rather than `%2B`.
pub fn filter(key: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let key = key.into();
    let value = value.into();
    RequestOption::custom(move |request| append_query_pair(&mut request.url, &key, &value))
}

/// Sort direction for [`sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sorts results on `field`.
pub fn sort(field: impl Into<String>, order: SortOrder) -> RequestOption {
    let mut value = field.into();
    if order == SortOrder::Descending {
        value.push_str("+DESC");
    }
    filter("Sort", value)
}

fn append_query_pair(url: &mut Url, key: &str, value: &str) {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, existing) in url.query_pairs() {
        serializer.append_pair(&name, &existing);
    }
    serializer.append_pair(key, value);
    let query = serializer.finish().replace("%2B", "+");
    url.set_query(Some(&query));
}

/// Builds a request: encodes the body, parses the URL, applies `options`,
/// then sets the `User-Agent` and `Accept` headers.
pub fn create_request(
    method: Method,
    url: &str,
    payload: &Payload<'_>,
    only_fields: Option<&[&str]>,
    options: &[RequestOption],
) -> Result<HttpRequest> {
    let body = encode(payload, only_fields).map_err(Error::Encoding)?;
    let url = Url::parse(url)
        .map_err(|e| Error::RequestConstruction(format!("invalid URL {:?}: {}", url, e)))?;

    let mut request = HttpRequest {
        method,
        url,
        headers: HeaderMap::new(),
        body,
    };
    for option in options {
        option.apply(&mut request);
    }

    let user_agent = HeaderValue::try_from(user_agent())
        .map_err(|e| Error::RequestConstruction(format!("invalid User-Agent: {}", e)))?;
    request.headers.append(USER_AGENT, user_agent);
    request
        .headers
        .append(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.mailjet.com/v3";

    fn get(url: &str, options: &[RequestOption]) -> HttpRequest {
        create_request(Method::GET, url, &Payload::Empty, None, options).unwrap()
    }

    #[test]
    fn test_create_request_headers() {
        let request = get(BASE, &[]);

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.as_str(), BASE);
        assert!(request.body.is_empty());
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");

        let ua = request.headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(ua.starts_with(&format!("mailjet/{};", env!("CARGO_PKG_VERSION"))));
        assert_eq!(ua, user_agent());
    }

    #[test]
    fn test_create_request_encodes_body() {
        let request =
            create_request(Method::POST, BASE, &Payload::from("{\"a\":1}"), None, &[]).unwrap();
        assert_eq!(request.body, b"{\"a\":1}");
    }

    #[test]
    fn test_invalid_url() {
        let result = create_request(Method::GET, "not a url", &Payload::Empty, None, &[]);
        assert!(matches!(result, Err(Error::RequestConstruction(_))));
    }

    #[test]
    fn test_filter_appends_query_pairs() {
        let request = get(
            &format!("{}/REST/contact", BASE),
            &[filter("ContactsList", "42"), filter("Limit", "10")],
        );
        assert_eq!(request.url.query(), Some("ContactsList=42&Limit=10"));
    }

    #[test]
    fn test_filter_keeps_literal_plus() {
        let request = get(
            &format!("{}/REST/contact?Offset=5", BASE),
            &[filter("Email", "a+b@c.d"), filter("Name", "x+y")],
        );
        assert_eq!(request.url.query(), Some("Offset=5&Email=a+b%40c.d&Name=x+y"));
    }

    #[test]
    fn test_sort_descending() {
        let request = get(BASE, &[sort("CreatedAt", SortOrder::Descending)]);
        assert_eq!(request.url.query(), Some("Sort=CreatedAt+DESC"));
    }

    #[test]
    fn test_sort_ascending() {
        let request = get(BASE, &[sort("Name", SortOrder::Ascending)]);
        assert_eq!(request.url.query(), Some("Sort=Name"));
    }

    #[test]
    fn test_custom_option() {
        let option = RequestOption::custom(|request| {
            request
                .headers
                .insert("x-custom", HeaderValue::from_static("1"));
        });
        let request = get(BASE, &[option]);
        assert_eq!(request.headers.get("x-custom").unwrap(), "1");
    }
}
