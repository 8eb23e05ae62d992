//! Mail transports: the live SMTP client and the network-free stand-in.

pub mod smtp;
pub mod stand_in;

pub use smtp::SmtpMailTransport;
pub use stand_in::StandInTransport;

use crate::error::TransportError;
use crate::models::{Message, StandInReason};
use crate::provider::Provider;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// What the server (or stand-in) said about an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReceipt {
    pub message_id: String,
    pub response: String,
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
}

/// Single send-and-await contract shared by live and stand-in transports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send `message` with the already-resolved sender.
    async fn send(&self, from: &str, message: &Message) -> Result<TransportReceipt, TransportError>;

    /// Handshake with the server without sending anything.
    async fn verify(&self) -> Result<(), TransportError>;

    fn name(&self) -> &'static str;
}

/// A provider's transport plus the metadata the dispatcher needs.
#[derive(Clone)]
pub struct Transport {
    provider: Provider,
    stand_in: Option<StandInReason>,
    inner: Arc<dyn MailTransport>,
}

impl Transport {
    pub fn live(provider: Provider, inner: Arc<dyn MailTransport>) -> Self {
        Self {
            provider,
            stand_in: None,
            inner,
        }
    }

    pub fn stand_in(provider: Provider, reason: StandInReason) -> Self {
        Self {
            provider,
            stand_in: Some(reason),
            inner: Arc::new(StandInTransport::new(provider, reason)),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn stand_in_reason(&self) -> Option<StandInReason> {
        self.stand_in
    }

    pub fn is_stand_in(&self) -> bool {
        self.stand_in.is_some()
    }

    pub async fn send(&self, from: &str, message: &Message) -> Result<TransportReceipt, TransportError> {
        self.inner.send(from, message).await
    }

    pub async fn verify(&self) -> Result<(), TransportError> {
        self.inner.verify().await
    }

    pub fn name(&self) -> &'static str {
        self.inner.name()
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("provider", &self.provider)
            .field("stand_in", &self.stand_in)
            .field("name", &self.inner.name())
            .finish()
    }
}
