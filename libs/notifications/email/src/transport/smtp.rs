//! Live SMTP transport using lettre

use super::{MailTransport, TransportReceipt};
use crate::config::ConnectionParams;
use crate::credentials::ResolvedCredentials;
use crate::error::TransportError;
use crate::models::Message;
use crate::provider::{Provider, Security};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, response::Response},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use std::future::Future;
use std::time::Duration;

/// SMTP reply codes that mean the server refused our credentials.
const AUTH_FAILURE_CODES: [&str; 4] = ["530", "534", "535", "538"];

/// Authenticated SMTP client for one provider
pub struct SmtpMailTransport {
    provider: Provider,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
    /// Right-hand side of generated Message-IDs
    id_domain: Option<String>,
}

impl SmtpMailTransport {
    /// Build the client. No connection is opened until `verify` or `send`.
    pub fn new(
        provider: Provider,
        params: &ConnectionParams,
        credentials: &ResolvedCredentials,
    ) -> Result<Self, TransportError> {
        let builder = match params.security {
            Security::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&params.host),
            Security::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&params.host),
        }
        .map_err(TransportError::from)?;

        let creds = Credentials::new(
            credentials.user.clone().unwrap_or_default(),
            credentials.secret().unwrap_or_default().to_string(),
        );

        let transport = builder
            .port(params.port)
            .credentials(creds)
            .timeout(Some(params.timeout))
            .build();

        Ok(Self {
            provider,
            transport,
            timeout: params.timeout,
            id_domain: credentials.domain.clone(),
        })
    }

    fn build_message(&self, from: &str, message: &Message) -> Result<lettre::Message, TransportError> {
        let from_mailbox: Mailbox = from
            .parse()
            .map_err(|e| TransportError::invalid_message(format!("Invalid from address '{}': {}", from, e)))?;

        let domain = self
            .id_domain
            .clone()
            .unwrap_or_else(|| from_mailbox.email.domain().to_string());

        let mut builder = lettre::Message::builder()
            .from(from_mailbox)
            .subject(message.subject.clone())
            .message_id(Some(format!("<{}@{}>", uuid::Uuid::new_v4(), domain)));

        for to in message.to_addresses() {
            builder = builder.to(parse_mailbox(&to, "to")?);
        }
        for cc in message.cc_addresses() {
            builder = builder.cc(parse_mailbox(&cc, "CC")?);
        }
        for bcc in message.bcc_addresses() {
            builder = builder.bcc(parse_mailbox(&bcc, "BCC")?);
        }

        let built = if message.attachments.is_empty() {
            builder
                .header(ContentType::TEXT_PLAIN)
                .body(message.body.clone())
        } else {
            let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(message.body.clone()));
            for attachment in &message.attachments {
                let content_type = ContentType::parse(&attachment.content_type)
                    .or_else(|_| ContentType::parse("application/octet-stream"))
                    .map_err(|e| {
                        TransportError::invalid_message(format!(
                            "Invalid content type for {}: {}",
                            attachment.filename, e
                        ))
                    })?;
                parts = parts.singlepart(
                    Attachment::new(attachment.filename.clone())
                        .body(attachment.content.clone(), content_type),
                );
            }
            builder.multipart(parts)
        };

        built.map_err(|e| TransportError::invalid_message(format!("Failed to build message: {}", e)))
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, lettre::transport::smtp::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(TransportError::from),
            Err(_) => Err(TransportError::timeout(format!(
                "{} did not answer within {}s",
                self.provider,
                self.timeout.as_secs()
            ))),
        }
    }
}

fn parse_mailbox(address: &str, field: &str) -> Result<Mailbox, TransportError> {
    address.parse().map_err(|e| {
        TransportError::invalid_message(format!("Invalid {} address '{}': {}", field, address, e))
    })
}

/// `250 2.0.0 OK queued as ...` style rendering of a server reply.
fn response_text(response: &Response) -> String {
    let lines: Vec<&str> = response.message().collect();
    format!("{} {}", response.code(), lines.join(" "))
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let message = err.to_string();

        if err.is_timeout() {
            return TransportError::timeout(message);
        }

        if let Some(code) = err.status() {
            let code = code.to_string();
            return if AUTH_FAILURE_CODES.contains(&code.as_str()) {
                TransportError::authentication(message).with_code(code)
            } else {
                TransportError::other(message).with_code(code)
            };
        }

        if err.is_client() || err.is_response() {
            TransportError::other(message)
        } else {
            // connection refused, DNS, TLS
            TransportError::connection(message)
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, from: &str, message: &Message) -> Result<TransportReceipt, TransportError> {
        let email = self.build_message(from, message)?;
        let message_id = email
            .headers()
            .get_raw("Message-ID")
            .map(str::to_string)
            .unwrap_or_default();

        let response = self.bounded(self.transport.send(email)).await?;

        tracing::info!(
            provider = %self.provider,
            message_id = %message_id,
            code = %response.code(),
            "SMTP server accepted message"
        );

        Ok(TransportReceipt {
            message_id,
            response: response_text(&response),
            accepted: message.recipients(),
            rejected: Vec::new(),
        })
    }

    async fn verify(&self) -> Result<(), TransportError> {
        let ready = self.bounded(self.transport.test_connection()).await?;
        if ready {
            Ok(())
        } else {
            Err(TransportError::connection(format!(
                "{} answered but is not ready to accept mail",
                self.provider
            )))
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MailConfig;
    use crate::credentials::CredentialResolver;
    use crate::error::TransportErrorKind;
    use crate::models::Attachment as MailAttachment;
    use std::sync::Arc;

    fn gmail_transport() -> SmtpMailTransport {
        let config = MailConfig::default().with_credentials(
            Provider::Gmail,
            crate::config::ProviderCredentials::new("me@gmail.com", "app-pass"),
        );
        let params = config.connection_params(Provider::Gmail);
        let creds = CredentialResolver::new(Arc::new(config)).resolve(Provider::Gmail);
        SmtpMailTransport::new(Provider::Gmail, &params, &creds).unwrap()
    }

    fn formatted(message: &lettre::Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn test_build_plain_message() {
        let transport = gmail_transport();
        let message = Message::new("a@example.com, b@example.com", "Hello", "Plain body")
            .with_cc("c@example.com");

        let built = transport.build_message("me@gmail.com", &message).unwrap();
        let raw = formatted(&built);

        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("Plain body"));
        assert!(raw.contains("Message-ID: <"));
        assert!(raw.contains("@gmail.com>"));
        assert_eq!(built.envelope().to().len(), 3);
    }

    #[test]
    fn test_bcc_only_in_envelope() {
        let transport = gmail_transport();
        let message = Message::new("a@example.com", "Hello", "Body").with_bcc("hidden@example.com");

        let built = transport.build_message("me@gmail.com", &message).unwrap();

        assert!(!formatted(&built).contains("hidden@example.com"));
        assert_eq!(built.envelope().to().len(), 2);
    }

    #[test]
    fn test_build_with_attachment() {
        let transport = gmail_transport();
        let message = Message::new("a@example.com", "Report", "See attached").with_attachment(
            MailAttachment::new("report.txt", b"quarterly numbers".to_vec(), "text/plain"),
        );

        let raw = formatted(&transport.build_message("me@gmail.com", &message).unwrap());

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("report.txt"));
    }

    #[test]
    fn test_unknown_content_type_falls_back() {
        let transport = gmail_transport();
        let message = Message::new("a@example.com", "Blob", "Body")
            .with_attachment(MailAttachment::new("blob.bin", vec![0u8, 1, 2], "not a type"));

        let raw = formatted(&transport.build_message("me@gmail.com", &message).unwrap());
        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn test_invalid_address_is_invalid_message() {
        let transport = gmail_transport();
        let message = Message::new("not-an-address", "Hello", "Body");

        let err = transport.build_message("me@gmail.com", &message).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidMessage);
        assert!(err.message.contains("not-an-address"));
    }

    #[test]
    fn test_response_text_joins_reply_lines() {
        use lettre::transport::smtp::response::{Category, Code, Detail, Severity};

        let response = Response::new(
            Code::new(Severity::PositiveCompletion, Category::MailSystem, Detail::Zero),
            vec!["2.0.0 OK".into(), "queued as 7F3A1".into()],
        );

        assert_eq!(response_text(&response), "250 2.0.0 OK queued as 7F3A1");
    }

    #[tokio::test]
    async fn test_verify_unreachable_host_is_connectivity() {
        let config = MailConfig {
            smtp_host: "localhost".into(),
            smtp_port: 9,
            ..Default::default()
        }
        .with_timeout(Duration::from_secs(2))
        .with_credentials(
            Provider::Gmail,
            crate::config::ProviderCredentials::new("me@gmail.com", "app-pass"),
        );
        let params = config.connection_params(Provider::Gmail);
        let creds = CredentialResolver::new(Arc::new(config)).resolve(Provider::Gmail);
        let transport = SmtpMailTransport::new(Provider::Gmail, &params, &creds).unwrap();

        let err = transport.verify().await.unwrap_err();
        assert!(matches!(
            err.kind,
            TransportErrorKind::Connection | TransportErrorKind::Timeout
        ));
    }
}
