//! Error types for API calls.
//!
//! Every failure in the request pipeline maps to one variant of [`Error`], from
//! payload encoding up to the Send API's structured rejections. Variants that
//! come from a server response keep the status code and the raw body so the
//! caller can inspect what was actually returned.

use crate::decode::DecodeError;
use crate::send::{ApiFeedbackErrors, ErrorInfoV31};
use http::StatusCode;
use serde::Deserialize;
use std::fmt;

/// Boxed error used at the pluggable transport seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error body returned by the REST and DATA surfaces.
///
/// ```json
/// {"ErrorInfo": "", "ErrorMessage": "Object not found", "StatusCode": 404}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiError {
    /// Extra information, often empty.
    #[serde(rename = "ErrorInfo")]
    pub info: String,
    /// Human readable message.
    #[serde(rename = "ErrorMessage")]
    pub message: String,
    /// Status code echoed by the server.
    #[serde(rename = "StatusCode")]
    pub status_code: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.info)
    }
}

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use mailjet::{Client, Error, ResourceRequest};
/// use mailjet::resources::Contact;
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("public", "private")?;
///
/// match client.get::<Vec<Contact>>(&ResourceRequest::new("contact").id(42), &[]).await {
///     Ok(response) => println!("found {} contact(s)", response.count),
///     Err(Error::Server { status, error, .. }) => {
///         eprintln!("server said {}: {}", status, error.message);
///     }
///     Err(e) => eprintln!("other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request payload could not be serialized.
    #[error("Failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The method, URL or a header could not be turned into a request.
    #[error("Failed to create request: {0}")]
    RequestConstruction(String),

    /// A network-level error occurred (connection refused, DNS, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a status outside `[200, 400)`.
    #[error("Unexpected server response code {status}: {error}")]
    Server {
        /// The final HTTP status code
        status: StatusCode,
        /// The decoded error body
        error: ApiError,
        /// The raw response body
        raw_response: String,
        /// The number of attempts made
        attempts: usize,
    },

    /// The server answered with an error status and a body that is not an error document.
    #[error("Unexpected server response code {status}: {serde_error}")]
    ServerUndecodable {
        /// The final HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// Why the error body could not be decoded
        serde_error: String,
        /// The number of attempts made
        attempts: usize,
    },

    /// A successful response could not be decoded into the requested target.
    #[error("Error decoding API response (status {status}): {source}")]
    Decoding {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The underlying decoding failure
        #[source]
        source: DecodeError,
    },

    /// The transport produced neither a response nor an error.
    #[error("Empty response")]
    EmptyResponse,

    /// The Send API v3.1 rejected one or more messages (400 or 403).
    #[error("Send API rejected the request: {0}")]
    SendRejected(ApiFeedbackErrors),

    /// The Send API v3.1 failed with any other status.
    #[error("Send API failed: {0}")]
    SendFailed(ErrorInfoV31),

    /// The SMTP transport failed to deliver the message.
    #[error("SMTP error: {0}")]
    Smtp(#[source] BoxError),

    /// Invalid configuration was provided.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Returns the HTTP status code if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Server { status, .. }
            | Error::ServerUndecodable { status, .. }
            | Error::Decoding { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error came from a response.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Server { raw_response, .. }
            | Error::ServerUndecodable { raw_response, .. }
            | Error::Decoding { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;
