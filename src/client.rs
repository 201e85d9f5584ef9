//! The API client: configuration, the retrying executor and the resource facade.
//!
//! Every call runs the same pipeline on values it owns: build the request,
//! execute it with retries, check the status, decode the body. Nothing is
//! shared between calls except the immutable configuration, so one
//! [`Client`] can serve many concurrent calls.

use crate::decode::{decode, Target};
use crate::endpoint::{DataRequest, ResourceRequest};
use crate::error::ApiError;
use crate::payload::Payload;
use crate::request::{create_request, RequestOption};
use crate::retry::{Outcome, RetryOnInternalServerError, RetryPredicate, RetryStrategy};
use crate::send::{ApiFeedbackErrors, ErrorInfoV31, InfoSendMail, MessagesV31, ResultsV31, SentResult};
use crate::smtp::{InfoSmtp, SmtpRelay, SmtpTransport};
use crate::transport::{Credentials, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::{Error, Response, Result};
use http::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderValue, Method, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Base URL of the production API.
pub const DEFAULT_BASE_URL: &str = "https://api.mailjet.com/v3";

const JSON: &str = "application/json";

/// How much of each exchange is written to `tracing` at `debug` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    /// No request or response dumps.
    #[default]
    None,
    /// Method, URL, status and headers.
    Headers,
    /// Headers plus request and response bodies.
    Full,
}

/// A client for the REST, DATA and Send APIs.
///
/// Cloning is cheap; clones share configuration and connection pool.
///
/// # Examples
///
/// ```no_run
/// use mailjet::resources::Contact;
/// use mailjet::{Client, Payload, ResourceRequest};
///
/// # async fn example() -> Result<(), mailjet::Error> {
/// let client = Client::new("public", "private")?;
///
/// let contact = Contact {
///     email: "passenger@mailjet.com".to_string(),
///     ..Default::default()
/// };
/// let created = client
///     .create::<Vec<Contact>>(&ResourceRequest::new("contact"), Payload::from(&contact), &[])
///     .await?;
/// println!("created contact {}", created[0].id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Clone)]
struct ClientInner {
    credentials: Credentials,
    base_url: String,
    user_agent: Option<HeaderValue>,
    retry_strategy: RetryStrategy,
    retry_predicate: Arc<dyn RetryPredicate>,
    debug_level: DebugLevel,
    http: Arc<dyn HttpTransport>,
    smtp: Arc<dyn SmtpTransport>,
}

/// A response that passed through the executor, before status checks.
struct Exchange {
    response: HttpResponse,
    latency: Duration,
    attempts: usize,
}

impl Client {
    /// Creates a client for the production API with default settings.
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Result<Self> {
        Self::builder(public_key, private_key).build()
    }

    pub fn builder(public_key: impl Into<String>, private_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(Credentials::new(public_key, private_key))
    }

    /// Creates a client from `MJ_APIKEY_PUBLIC`, `MJ_APIKEY_PRIVATE` and,
    /// when set, `MJ_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a key is missing or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let public_key = required_var(&lookup, "MJ_APIKEY_PUBLIC")?;
        let private_key = required_var(&lookup, "MJ_APIKEY_PRIVATE")?;
        let mut builder = Self::builder(public_key, private_key);
        if let Some(base_url) = lookup("MJ_BASE_URL") {
            builder = builder.base_url(base_url)?;
        }
        builder.build()
    }

    pub fn api_key_public(&self) -> &str {
        self.inner.credentials.public_key()
    }

    pub fn api_key_private(&self) -> &str {
        self.inner.credentials.private_key()
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns a client pointed at another base URL, sharing everything else.
    pub fn with_base_url(&self, base_url: impl AsRef<str>) -> Result<Self> {
        let mut inner = (*self.inner).clone();
        inner.base_url = parse_base_url(base_url.as_ref())?;
        Ok(Client {
            inner: Arc::new(inner),
        })
    }

    /// Lists a REST resource.
    ///
    /// ```no_run
    /// use mailjet::request::{filter, sort, SortOrder};
    /// use mailjet::resources::Contact;
    /// use mailjet::Client;
    ///
    /// # async fn example() -> Result<(), mailjet::Error> {
    /// # let client = Client::new("public", "private")?;
    /// let contacts = client
    ///     .list::<Vec<Contact>>(
    ///         "contact",
    ///         &[filter("Limit", "10"), sort("CreatedAt", SortOrder::Descending)],
    ///     )
    ///     .await?;
    /// println!("{} of {}", contacts.count, contacts.total);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list<T: Target>(&self, resource: &str, options: &[RequestOption]) -> Result<Response<T>> {
        let url = ResourceRequest::new(resource).url(&self.inner.base_url);
        let request = create_request(Method::GET, &url, &Payload::Empty, None, options)?;
        self.call(request).await
    }

    /// Fetches a REST resource, optionally one object of it.
    pub async fn get<T: Target>(
        &self,
        resource: &ResourceRequest,
        options: &[RequestOption],
    ) -> Result<Response<T>> {
        let url = resource.url(&self.inner.base_url);
        let request = create_request(Method::GET, &url, &Payload::Empty, None, options)?;
        self.call(request).await
    }

    /// Creates a REST object. The whole payload is sent, minus read-only and
    /// empty omittable fields.
    pub async fn create<T: Target>(
        &self,
        resource: &ResourceRequest,
        payload: Payload<'_>,
        options: &[RequestOption],
    ) -> Result<Response<T>> {
        let url = resource.url(&self.inner.base_url);
        let request = json_request(Method::POST, &url, &payload, None, options)?;
        self.call(request).await
    }

    /// Updates a REST object.
    ///
    /// With `only_fields`, only those fields (by declared name) are sent.
    pub async fn update(
        &self,
        resource: &ResourceRequest,
        payload: Payload<'_>,
        only_fields: Option<&[&str]>,
        options: &[RequestOption],
    ) -> Result<()> {
        let url = resource.url(&self.inner.base_url);
        let request = json_request(Method::PUT, &url, &payload, only_fields, options)?;
        self.call::<()>(request).await.map(|_| ())
    }

    pub async fn delete(&self, resource: &ResourceRequest) -> Result<()> {
        let url = resource.url(&self.inner.base_url);
        let request = create_request(Method::DELETE, &url, &Payload::Empty, None, &[])?;
        self.call::<()>(request).await.map(|_| ())
    }

    /// Lists a DATA source type.
    pub async fn list_data<T: Target>(
        &self,
        source_type: &str,
        options: &[RequestOption],
    ) -> Result<Response<T>> {
        let url = DataRequest::new(source_type).url(&self.inner.base_url);
        let request = create_request(Method::GET, &url, &Payload::Empty, None, options)?;
        self.call(request).await
    }

    /// Fetches DATA content. Use [`CsvTable`](crate::decode::CsvTable) as
    /// the target for CSV content.
    pub async fn get_data<T: Target>(
        &self,
        data: &DataRequest,
        options: &[RequestOption],
    ) -> Result<Response<T>> {
        let url = data.url(&self.inner.base_url);
        let request = create_request(Method::GET, &url, &Payload::Empty, None, options)?;
        self.call(request).await
    }

    /// Uploads DATA content with the request's MIME type.
    pub async fn create_data<T: Target>(
        &self,
        data: &DataRequest,
        payload: Payload<'_>,
        options: &[RequestOption],
    ) -> Result<Response<T>> {
        let url = data.url(&self.inner.base_url);
        let mut request = create_request(Method::POST, &url, &payload, None, options)?;
        set_content_type(&mut request, &data.content_type())?;
        self.call(request).await
    }

    pub async fn update_data(
        &self,
        data: &DataRequest,
        payload: Payload<'_>,
        only_fields: Option<&[&str]>,
        options: &[RequestOption],
    ) -> Result<()> {
        let url = data.url(&self.inner.base_url);
        let request = json_request(Method::PUT, &url, &payload, only_fields, options)?;
        self.call::<()>(request).await.map(|_| ())
    }

    pub async fn delete_data(&self, data: &DataRequest, options: &[RequestOption]) -> Result<()> {
        let url = data.url(&self.inner.base_url);
        let request = create_request(Method::DELETE, &url, &Payload::Empty, None, options)?;
        self.call::<()>(request).await.map(|_| ())
    }

    /// Sends messages through the v3 Send API.
    pub async fn send_mail(&self, mail: &InfoSendMail) -> Result<SentResult> {
        let url = format!("{}/send/message", self.inner.base_url);
        let request = json_request(Method::POST, &url, &Payload::from(mail), None, &[])?;
        let response = self.call::<SentResult>(request).await?;
        Ok(response.into_data())
    }

    /// Sends messages through the v3.1 Send API.
    ///
    /// # Errors
    ///
    /// A 400 or 403 answer becomes [`Error::SendRejected`] with the
    /// per-message feedback; any other non-200 answer becomes
    /// [`Error::SendFailed`].
    pub async fn send_mail_v31(&self, messages: &MessagesV31) -> Result<ResultsV31> {
        let url = format!("{}.1/send", self.inner.base_url);
        let request = json_request(Method::POST, &url, &Payload::from(messages), None, &[])?;
        let exchange = self.execute(request).await?;
        let status = exchange.response.status;
        let body = &exchange.response.body;

        match status {
            StatusCode::OK => serde_json::from_slice::<ResultsV31>(body).map_err(|e| Error::Decoding {
                status,
                raw_response: exchange.response.text(),
                source: e.into(),
            }),
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => {
                match serde_json::from_slice::<ApiFeedbackErrors>(body) {
                    Ok(feedback) => Err(Error::SendRejected(feedback)),
                    Err(e) => Err(undecodable(exchange, e)),
                }
            }
            _ => match serde_json::from_slice::<ErrorInfoV31>(body) {
                Ok(info) => Err(Error::SendFailed(info)),
                Err(e) => Err(undecodable(exchange, e)),
            },
        }
    }

    /// Relays a message over SMTP, authenticated with the client's keys.
    ///
    /// Uses [`SmtpRelay`] unless [`ClientBuilder::smtp_transport`] set
    /// another transport.
    pub async fn send_mail_smtp(&self, info: &InfoSmtp) -> Result<()> {
        tracing::debug!(
            from = %info.from,
            recipients = info.recipients.len(),
            "Relaying message over SMTP"
        );
        self.inner
            .smtp
            .send_mail(
                &self.inner.credentials,
                &info.from,
                &info.recipients,
                info.build_message(),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "SMTP delivery failed");
                Error::Smtp(e)
            })
    }

    /// Executes, checks the status and decodes into `T`.
    async fn call<T: Target>(&self, request: HttpRequest) -> Result<Response<T>> {
        let exchange = self.execute(request).await?;
        let exchange = check_status(exchange)?;
        decode_exchange(exchange)
    }

    /// Runs the request until it succeeds, fails for good, or runs out of
    /// attempts. The final response is returned whatever its status.
    async fn execute(&self, mut request: HttpRequest) -> Result<Exchange> {
        let authorization = self
            .inner
            .credentials
            .authorization()
            .map_err(|e| Error::RequestConstruction(format!("invalid API keys: {}", e)))?;
        request.headers.insert(AUTHORIZATION, authorization);
        if let Some(user_agent) = &self.inner.user_agent {
            request.headers.insert(USER_AGENT, user_agent.clone());
        }

        let strategy = &self.inner.retry_strategy;
        let predicate = &self.inner.retry_predicate;
        let start_time = Instant::now();

        for attempt in 1..=strategy.max_attempts() {
            self.log_request(&request, attempt);

            match self.inner.http.execute(request.clone()).await {
                Ok(response) => {
                    self.log_response(&response);

                    let outcome = Outcome::Status(response.status);
                    if predicate.should_retry(&outcome, attempt) {
                        if let Some(delay) = strategy.delay_before(attempt + 1) {
                            tracing::warn!(
                                status = response.status.as_u16(),
                                attempt = attempt,
                                delay_ms = delay.as_millis(),
                                "Retrying request"
                            );
                            sleep(delay).await;
                            continue;
                        }
                    }

                    let latency = start_time.elapsed();
                    tracing::info!(
                        status = response.status.as_u16(),
                        latency_ms = latency.as_millis(),
                        attempts = attempt,
                        "Received HTTP response"
                    );
                    return Ok(Exchange {
                        response,
                        latency,
                        attempts: attempt,
                    });
                }
                Err(error) => {
                    if predicate.should_retry(&Outcome::TransportError(&error), attempt) {
                        if let Some(delay) = strategy.delay_before(attempt + 1) {
                            tracing::warn!(
                                error = %error,
                                attempt = attempt,
                                delay_ms = delay.as_millis(),
                                "Retrying request after transport error"
                            );
                            sleep(delay).await;
                            continue;
                        }
                    }

                    tracing::error!(
                        error = %error,
                        method = %request.method,
                        url = %request.url,
                        attempt = attempt,
                        "Request failed"
                    );
                    return Err(Error::Transport(error));
                }
            }
        }

        Err(Error::EmptyResponse)
    }

    fn log_request(&self, request: &HttpRequest, attempt: usize) {
        match self.inner.debug_level {
            DebugLevel::None => {}
            DebugLevel::Headers => tracing::debug!(
                method = %request.method,
                url = %request.url,
                headers = ?request.headers,
                attempt = attempt,
                "Sending request"
            ),
            DebugLevel::Full => tracing::debug!(
                method = %request.method,
                url = %request.url,
                headers = ?request.headers,
                body = %String::from_utf8_lossy(&request.body),
                attempt = attempt,
                "Sending request"
            ),
        }
    }

    fn log_response(&self, response: &HttpResponse) {
        match self.inner.debug_level {
            DebugLevel::None => {}
            DebugLevel::Headers => tracing::debug!(
                status = response.status.as_u16(),
                headers = ?response.headers,
                "Received response"
            ),
            DebugLevel::Full => tracing::debug!(
                status = response.status.as_u16(),
                headers = ?response.headers,
                body = %response.text(),
                "Received response"
            ),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.inner.credentials)
            .field("base_url", &self.inner.base_url)
            .field("retry_strategy", &self.inner.retry_strategy)
            .field("debug_level", &self.inner.debug_level)
            .finish()
    }
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn json_request(
    method: Method,
    url: &str,
    payload: &Payload<'_>,
    only_fields: Option<&[&str]>,
    options: &[RequestOption],
) -> Result<HttpRequest> {
    let mut request = create_request(method, url, payload, only_fields, options)?;
    set_content_type(&mut request, JSON)?;
    Ok(request)
}

fn set_content_type(request: &mut HttpRequest, content_type: &str) -> Result<()> {
    let value = HeaderValue::try_from(content_type).map_err(|e| {
        Error::RequestConstruction(format!("invalid Content-Type {:?}: {}", content_type, e))
    })?;
    request.headers.insert(CONTENT_TYPE, value);
    Ok(())
}

/// Statuses outside `[200, 400)` become [`Error::Server`].
fn check_status(exchange: Exchange) -> Result<Exchange> {
    let status = exchange.response.status;
    if (200..400).contains(&status.as_u16()) {
        return Ok(exchange);
    }

    let raw_response = exchange.response.text();
    if status.is_client_error() {
        tracing::error!(status = status.as_u16(), response = %raw_response, "Client error (4xx)");
    } else {
        tracing::warn!(status = status.as_u16(), response = %raw_response, "Server error");
    }

    match serde_json::from_slice::<ApiError>(&exchange.response.body) {
        Ok(error) => Err(Error::Server {
            status,
            error,
            raw_response,
            attempts: exchange.attempts,
        }),
        Err(e) => Err(undecodable(exchange, e)),
    }
}

fn undecodable(exchange: Exchange, e: serde_json::Error) -> Error {
    Error::ServerUndecodable {
        status: exchange.response.status,
        raw_response: exchange.response.text(),
        serde_error: e.to_string(),
        attempts: exchange.attempts,
    }
}

fn decode_exchange<T: Target>(exchange: Exchange) -> Result<Response<T>> {
    let Exchange {
        response,
        latency,
        attempts,
    } = exchange;

    match decode::<T>(&response.body, response.content_type()) {
        Ok(decoded) => Ok(Response::from_exchange(decoded, response, latency, attempts)),
        Err(source) => {
            let raw_response = response.text();
            tracing::error!(
                error = %source,
                raw_response = %raw_response,
                "Failed to decode response"
            );
            Err(Error::Decoding {
                status: response.status,
                raw_response,
                source,
            })
        }
    }
}

fn required_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Configuration(format!("{} is not set", name))),
    }
}

fn parse_base_url(base_url: &str) -> Result<String> {
    Url::parse(base_url)
        .map_err(|e| Error::Configuration(format!("invalid base URL {:?}: {}", base_url, e)))?;
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Builder for a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use mailjet::{Client, DebugLevel, RetryStrategy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), mailjet::Error> {
/// let client = Client::builder("public", "private")
///     .timeout(Duration::from_secs(30))
///     .retry_strategy(RetryStrategy::ExponentialBackoff {
///         initial_delay: Duration::from_millis(100),
///         max_delay: Duration::from_secs(10),
///         max_attempts: 4,
///         jitter: true,
///     })
///     .debug_level(DebugLevel::Headers)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    credentials: Credentials,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Arc<dyn RetryPredicate>>,
    debug_level: DebugLevel,
    http_transport: Option<Arc<dyn HttpTransport>>,
    smtp_transport: Option<Arc<dyn SmtpTransport>>,
}

impl ClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: None,
            retry_strategy: RetryStrategy::default(),
            retry_predicate: None,
            debug_level: DebugLevel::None,
            http_transport: None,
            smtp_transport: None,
        }
    }

    /// Sets the base URL, e.g. `https://api.mailjet.com/v3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = parse_base_url(url.as_ref())?;
        Ok(self)
    }

    /// Sets the per-attempt timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the default `User-Agent`.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default, only `500 Internal Server Error` is retried.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(Arc::from(predicate));
        self
    }

    pub fn debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Uses `transport` instead of the default `reqwest` one. The timeout
    /// setting does not apply to custom transports.
    pub fn http_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.http_transport = Some(transport);
        self
    }

    /// Uses `transport` instead of the default [`SmtpRelay`].
    pub fn smtp_transport(mut self, transport: Arc<dyn SmtpTransport>) -> Self {
        self.smtp_transport = Some(transport);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `User-Agent` is not a valid header value or
    /// the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let user_agent = self
            .user_agent
            .map(|ua| {
                HeaderValue::try_from(ua)
                    .map_err(|e| Error::Configuration(format!("Invalid User-Agent: {}", e)))
            })
            .transpose()?;

        let http: Arc<dyn HttpTransport> = match self.http_transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let client = builder.build().map_err(|e| {
                    Error::Configuration(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(ReqwestTransport::new(client))
            }
        };

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Arc::new(RetryOnInternalServerError));

        Ok(Client {
            inner: Arc::new(ClientInner {
                credentials: self.credentials,
                base_url: self.base_url,
                user_agent,
                retry_strategy: self.retry_strategy,
                retry_predicate,
                debug_level: self.debug_level,
                http,
                smtp: self
                    .smtp_transport
                    .unwrap_or_else(|| Arc::new(SmtpRelay::default())),
            }),
        })
    }
}
