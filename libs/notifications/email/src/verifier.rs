//! One-time connectivity check for freshly created live transports.

use crate::error::TransportError;
use crate::transport::Transport;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct ConnectivityVerifier {
    timeout: Duration,
}

impl ConnectivityVerifier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// SMTP handshake, bounded by the configured timeout.
    ///
    /// Stand-ins pass without touching the network.
    pub async fn verify(&self, transport: &Transport) -> Result<(), TransportError> {
        if transport.is_stand_in() {
            return Ok(());
        }

        let provider = transport.provider();
        let result = match tokio::time::timeout(self.timeout, transport.verify()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(format!(
                "{} verification did not finish within {}s",
                provider,
                self.timeout.as_secs()
            ))),
        };

        match &result {
            Ok(()) => info!(provider = %provider, "Transport verified"),
            Err(err) => warn!(
                provider = %provider,
                kind = ?err.kind,
                code = ?err.code,
                error = %err,
                "Transport verification failed"
            ),
        }

        result
    }
}
