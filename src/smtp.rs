//! Sending mail through the SMTP relay.
//!
//! Messages are framed by [`InfoSmtp`] and handed to an [`SmtpTransport`].
//! Clients use [`SmtpRelay`] unless another transport is set at build time.

use crate::error::BoxError;
use crate::transport::{BoxFuture, Credentials};
use lettre::address::{Address, Envelope};
use lettre::transport::smtp::authentication::{Credentials as SmtpCredentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::collections::BTreeMap;

/// SMTP relay host.
pub const SMTP_HOST: &str = "in-v3.mailjet.com";

/// SMTP relay submission port.
pub const SMTP_PORT: u16 = 587;

/// A message to relay over SMTP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSmtp {
    pub from: String,
    pub recipients: Vec<String>,
    /// Header name to values; written in name order.
    pub headers: BTreeMap<String, Vec<String>>,
    pub content: Vec<u8>,
}

impl InfoSmtp {
    /// The message as written on the wire: one `Name: v1, v2` line per
    /// header, a blank line, then the content.
    pub fn build_message(&self) -> Vec<u8> {
        let mut message = Vec::with_capacity(self.content.len() + 64);
        for (name, values) in &self.headers {
            message.extend_from_slice(name.as_bytes());
            message.extend_from_slice(b": ");
            message.extend_from_slice(values.join(", ").as_bytes());
            message.extend_from_slice(b"\r\n");
        }
        message.extend_from_slice(b"\r\n");
        message.extend_from_slice(&self.content);
        message
    }
}

/// Delivers one message to an SMTP relay.
///
/// `credentials` are the client's API keys: the public key is the user name
/// and the private key the password.
pub trait SmtpTransport: Send + Sync {
    fn send_mail<'a>(
        &'a self,
        credentials: &'a Credentials,
        from: &'a str,
        to: &'a [String],
        message: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// Relays over STARTTLS with `PLAIN` authentication, by default to
/// [`SMTP_HOST`]:[`SMTP_PORT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpRelay {
    host: String,
    port: u16,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A transport for this relay, authenticated with `credentials`.
    ///
    /// Nothing is contacted until a message is sent.
    pub fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(SmtpCredentials::new(
                credentials.public_key().to_string(),
                credentials.private_key().to_string(),
            ))
            .authentication(vec![Mechanism::Plain])
            .build();
        Ok(transport)
    }
}

impl Default for SmtpRelay {
    fn default() -> Self {
        Self::new(SMTP_HOST, SMTP_PORT)
    }
}

impl SmtpTransport for SmtpRelay {
    fn send_mail<'a>(
        &'a self,
        credentials: &'a Credentials,
        from: &'a str,
        to: &'a [String],
        message: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(async move {
            let envelope = envelope(from, to)?;
            let transport = self.connect(credentials)?;
            transport.send_raw(&envelope, &message).await?;
            Ok(())
        })
    }
}

fn envelope(from: &str, to: &[String]) -> Result<Envelope, BoxError> {
    let from: Address = from.parse()?;
    let to = to
        .iter()
        .map(|address| address.parse::<Address>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Envelope::new(Some(from), to)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message() {
        let mut headers = BTreeMap::new();
        headers.insert("To".to_string(), vec!["a@b.c".to_string(), "d@e.f".to_string()]);
        headers.insert("Subject".to_string(), vec!["Hello".to_string()]);

        let info = InfoSmtp {
            from: "me@example.com".to_string(),
            recipients: vec!["a@b.c".to_string(), "d@e.f".to_string()],
            headers,
            content: b"Hi!".to_vec(),
        };

        assert_eq!(
            info.build_message(),
            b"Subject: Hello\r\nTo: a@b.c, d@e.f\r\n\r\nHi!".to_vec()
        );
    }

    #[test]
    fn test_build_message_without_headers() {
        let info = InfoSmtp {
            content: b"body".to_vec(),
            ..Default::default()
        };
        assert_eq!(info.build_message(), b"\r\nbody".to_vec());
    }

    #[test]
    fn test_default_relay() {
        let relay = SmtpRelay::default();
        assert_eq!(relay.host(), "in-v3.mailjet.com");
        assert_eq!(relay.port(), 587);
        assert!(relay.connect(&Credentials::new("public", "private")).is_ok());
    }

    #[test]
    fn test_envelope() {
        let to = vec!["a@b.c".to_string(), "d@e.f".to_string()];
        let built = envelope("me@example.com", &to).unwrap();
        assert_eq!(built.from().map(ToString::to_string).as_deref(), Some("me@example.com"));
        assert_eq!(built.to().len(), 2);

        assert!(envelope("me@example.com", &[]).is_err());
    }

    #[tokio::test]
    async fn test_invalid_address_fails_before_connecting() {
        let relay = SmtpRelay::new("relay.invalid", 2525);
        let credentials = Credentials::new("public", "private");
        let to = vec!["a@b.c".to_string()];

        let err = relay
            .send_mail(&credentials, "not an address", &to, b"body".to_vec())
            .await
            .unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
