//! # mailjet - A client for the Mailjet email API
//!
//! Typed access to the REST and DATA resource APIs, the v3 and v3.1 Send
//! APIs and the SMTP relay, built on top of `reqwest`. Requests are retried
//! on transient server failures, failures keep the raw server response, and
//! every exchange can be traced with `tracing`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mailjet::resources::Contact;
//! use mailjet::send::{InfoMessagesV31, MessagesV31, RecipientV31};
//! use mailjet::{Client, Payload, ResourceRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mailjet::Error> {
//!     let client = Client::from_env()?;
//!
//!     // Create a contact
//!     let contact = Contact {
//!         email: "passenger@mailjet.com".to_string(),
//!         name: "Passenger".to_string(),
//!         ..Default::default()
//!     };
//!     client
//!         .create::<Vec<Contact>>(&ResourceRequest::new("contact"), Payload::from(&contact), &[])
//!         .await?;
//!
//!     // Update only its name
//!     let renamed = Contact {
//!         name: "Passenger 1".to_string(),
//!         ..Default::default()
//!     };
//!     client
//!         .update(
//!             &ResourceRequest::new("contact").alt_id("passenger@mailjet.com"),
//!             Payload::from(&renamed),
//!             Some(&["Name"]),
//!             &[],
//!         )
//!         .await?;
//!
//!     // Send a message
//!     let messages = MessagesV31 {
//!         messages: vec![InfoMessagesV31 {
//!             from: Some(RecipientV31::named("pilot@mailjet.com", "Pilot")),
//!             to: vec![RecipientV31::new("passenger@mailjet.com")],
//!             subject: "Your email flight plan!".to_string(),
//!             text_part: "May the delivery force be with you!".to_string(),
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     };
//!     let results = client.send_mail_v31(&messages).await?;
//!     println!("{:?}", results.results[0].status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Field selection
//!
//! Request bodies are [`Record`](payload::Record)s declared with
//! [`record!`]. Read-only fields are never sent; `update` can restrict the
//! body to the fields named in its selection.
//!
//! ## Error Handling
//!
//! ```no_run
//! use mailjet::{Client, Error};
//! use mailjet::send::MessagesV31;
//!
//! # async fn example(client: Client, messages: MessagesV31) {
//! match client.send_mail_v31(&messages).await {
//!     Ok(results) => println!("sent {} message(s)", results.results.len()),
//!     Err(Error::SendRejected(feedback)) => {
//!         for error in feedback.errors() {
//!             eprintln!("{}: {}", error.error_code, error.error_message);
//!         }
//!     }
//!     Err(e) => eprintln!("send failed: {}", e),
//! }
//! # }
//! ```
//!
//! ## Retry Strategies
//!
//! By default a call is attempted up to five times, retrying immediately
//! on `500 Internal Server Error` only:
//!
//! ```no_run
//! use mailjet::retry::{OrPredicate, RetryOn5xx, RetryOnConnectionError};
//! use mailjet::{Client, RetryStrategy};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), mailjet::Error> {
//! let client = Client::builder("public", "private")
//!     .retry_strategy(RetryStrategy::ExponentialBackoff {
//!         initial_delay: Duration::from_millis(100),
//!         max_delay: Duration::from_secs(30),
//!         max_attempts: 5,
//!         jitter: true,
//!     })
//!     .retry_predicate(Box::new(OrPredicate::new(vec![
//!         Box::new(RetryOn5xx),
//!         Box::new(RetryOnConnectionError),
//!     ])))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod decode;
pub mod endpoint;
mod error;
pub mod payload;
pub mod request;
pub mod resources;
mod response;
pub mod retry;
pub mod send;
pub mod smtp;
pub mod transport;

pub use client::{Client, ClientBuilder, DebugLevel, DEFAULT_BASE_URL};
pub use endpoint::{DataRequest, ResourceRequest};
pub use error::{ApiError, BoxError, Error, Result};
pub use payload::Payload;
pub use response::Response;
pub use retry::{RetryPredicate, RetryStrategy};
