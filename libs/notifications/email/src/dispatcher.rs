//! Public entry point: validate, pick the transport, send, normalize.

use crate::cache::TransportCache;
use crate::config::MailConfig;
use crate::error::{DispatchError, DispatchResult, TransportError};
use crate::models::{DeliveryResult, Message, StandInReason};
use crate::provider::Provider;
use crate::transport::TransportReceipt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Sender used by stand-in transports when none is configured.
pub const STAND_IN_SENDER: &str = "noreply@localhost";

#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<MailConfig>,
    cache: Arc<TransportCache>,
}

impl Dispatcher {
    pub fn new(config: Arc<MailConfig>, cache: Arc<TransportCache>) -> Self {
        Self { config, cache }
    }

    /// Dispatcher with a fresh cache over live SMTP connections.
    pub fn from_config(config: MailConfig) -> Self {
        let config = Arc::new(config);
        let cache = Arc::new(TransportCache::new(config.clone()));
        Self::new(config, cache)
    }

    pub fn cache(&self) -> &Arc<TransportCache> {
        &self.cache
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    /// Send using a provider token from the outside world (`"sendgrid"`, ...).
    pub async fn send_to(&self, message: &Message, provider: &str) -> DispatchResult<DeliveryResult> {
        let provider = Provider::from_token(provider)?;
        self.send(message, provider).await
    }

    #[instrument(
        skip(self, message),
        fields(
            provider = %provider,
            recipients = message.recipients().len(),
            attachments = message.attachments.len(),
        )
    )]
    pub async fn send(&self, message: &Message, provider: Provider) -> DispatchResult<DeliveryResult> {
        let missing = message.missing_fields();
        if !missing.is_empty() {
            return Err(DispatchError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let sender = message
            .from
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.default_sender(provider));

        let transport = self.cache.get_transport(provider).await;

        let from = match (sender, transport.stand_in_reason()) {
            (Some(sender), _) => sender,
            (None, Some(_)) => STAND_IN_SENDER.to_string(),
            (None, None) => {
                return Err(DispatchError::Configuration(format!(
                    "No sender address configured for {}",
                    provider
                )));
            }
        };

        info!(stand_in = ?transport.stand_in_reason(), "Dispatching message");

        // SMTP transports bound themselves with the same duration; this covers
        // any other `MailTransport` behind the connector.
        let sent = match tokio::time::timeout(self.config.timeout, transport.send(&from, message)).await {
            Ok(sent) => sent,
            Err(_) => Err(TransportError::timeout(format!(
                "Send did not complete within {}s",
                self.config.timeout.as_secs()
            ))),
        };

        let receipt = sent.map_err(|err| {
            let err = DispatchError::from_transport(provider, err);
            warn!(kind = err.kind().as_str(), error = %err, "Dispatch failed");
            err
        })?;

        let result = delivery_result(provider, transport.stand_in_reason(), receipt);
        info!(
            message_id = %result.message_id,
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            simulated = result.is_simulated(),
            "Message dispatched"
        );

        Ok(result)
    }
}

fn delivery_result(
    provider: Provider,
    stand_in: Option<StandInReason>,
    receipt: TransportReceipt,
) -> DeliveryResult {
    let settings = provider.settings();

    let preview_url = settings.preview_base_url.map(|base| {
        let id = preview_id(&receipt.response, &receipt.message_id);
        format!("{}/{}", base, id)
    });

    let stand_in_notice = stand_in.map(|reason| match reason {
        StandInReason::CredentialsUnavailable => format!(
            "{} provider needs configuration. The email was not sent; set its credentials to enable delivery.",
            settings.display_name
        ),
        StandInReason::Mock => format!(
            "{} delivery is simulated. The email was not delivered to any inbox.",
            settings.display_name
        ),
    });

    DeliveryResult {
        message_id: receipt.message_id,
        response: receipt.response,
        accepted: receipt.accepted,
        rejected: receipt.rejected,
        preview_url,
        stand_in_notice,
        stand_in_reason: stand_in,
    }
}

/// `MSGID=` token of the server reply, else the Message-ID without brackets.
fn preview_id(response: &str, message_id: &str) -> String {
    response
        .split_once("MSGID=")
        .map(|(_, rest)| {
            rest.split(|c: char| c.is_whitespace() || c == ']')
                .next()
                .unwrap_or_default()
        })
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| message_id.trim_matches(|c| c == '<' || c == '>'))
        .to_string()
}
