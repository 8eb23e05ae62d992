//! Network-free transport used when a provider cannot be reached for real.

use super::{MailTransport, TransportReceipt};
use crate::error::TransportError;
use crate::models::{Message, StandInReason};
use crate::provider::Provider;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Synthetic transport that always succeeds and never opens a socket.
pub struct StandInTransport {
    provider: Provider,
    reason: StandInReason,
    sent: AtomicUsize,
}

impl StandInTransport {
    pub fn new(provider: Provider, reason: StandInReason) -> Self {
        Self {
            provider,
            reason,
            sent: AtomicUsize::new(0),
        }
    }

    pub fn reason(&self) -> StandInReason {
        self.reason
    }

    /// Number of simulated sends so far
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    fn message_id(&self) -> String {
        let prefix = match self.reason {
            StandInReason::Mock => "mock",
            StandInReason::CredentialsUnavailable => "unavailable",
        };
        format!(
            "{}-{}-{}-{}@localhost",
            prefix,
            self.provider,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        )
    }

    fn response(&self) -> String {
        let name = self.provider.settings().display_name;
        match self.reason {
            StandInReason::Mock => format!("Mock {} email sent successfully", name),
            StandInReason::CredentialsUnavailable => format!(
                "{} email not sent: Credentials not available, please configure later",
                name
            ),
        }
    }
}

#[async_trait]
impl MailTransport for StandInTransport {
    async fn send(&self, from: &str, message: &Message) -> Result<TransportReceipt, TransportError> {
        self.sent.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            provider = %self.provider,
            reason = ?self.reason,
            from = %from,
            recipients = message.recipients().len(),
            "Simulated send, nothing delivered"
        );

        Ok(TransportReceipt {
            message_id: self.message_id(),
            response: self.response(),
            accepted: message.recipients(),
            rejected: Vec::new(),
        })
    }

    async fn verify(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        match self.reason {
            StandInReason::Mock => "mock",
            StandInReason::CredentialsUnavailable => "unconfigured",
        }
    }
}
