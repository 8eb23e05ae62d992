//! Builds the transport for a provider from its resolved credentials.

use crate::config::{ConnectionParams, MailConfig};
use crate::credentials::ResolvedCredentials;
use crate::error::TransportError;
use crate::models::StandInReason;
use crate::provider::Provider;
use crate::transport::{MailTransport, SmtpMailTransport, Transport};
use std::sync::Arc;
use tracing::{info, warn};

/// Opens live transports. The only place that knows about the network.
#[cfg_attr(test, mockall::automock)]
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        provider: Provider,
        params: &ConnectionParams,
        credentials: &ResolvedCredentials,
    ) -> Result<Arc<dyn MailTransport>, TransportError>;
}

/// Production connector backed by lettre.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpConnector;

impl Connector for SmtpConnector {
    fn connect(
        &self,
        provider: Provider,
        params: &ConnectionParams,
        credentials: &ResolvedCredentials,
    ) -> Result<Arc<dyn MailTransport>, TransportError> {
        let transport = SmtpMailTransport::new(provider, params, credentials)?;
        Ok(Arc::new(transport))
    }
}

pub struct TransportFactory {
    config: Arc<MailConfig>,
    connector: Arc<dyn Connector>,
}

impl TransportFactory {
    pub fn new(config: Arc<MailConfig>) -> Self {
        Self::with_connector(config, Arc::new(SmtpConnector))
    }

    pub fn with_connector(config: Arc<MailConfig>, connector: Arc<dyn Connector>) -> Self {
        Self { config, connector }
    }

    /// Decide between a live transport and a stand-in.
    ///
    /// Never fails: anything that prevents a live transport yields a stand-in.
    pub fn create(&self, provider: Provider, credentials: &ResolvedCredentials) -> Transport {
        if self.config.force_stand_in {
            info!(provider = %provider, "Stand-in transport forced by configuration");
            return Transport::stand_in(provider, StandInReason::Mock);
        }

        if !credentials.configured {
            warn!(
                provider = %provider,
                readiness = ?credentials.readiness,
                "Credentials not available, messages will not be delivered"
            );
            return Transport::stand_in(provider, StandInReason::CredentialsUnavailable);
        }

        let params = self.config.connection_params(provider);
        match self.connector.connect(provider, &params, credentials) {
            Ok(inner) => {
                info!(
                    provider = %provider,
                    host = %params.host,
                    port = params.port,
                    security = ?params.security,
                    "Created live transport"
                );
                Transport::live(provider, inner)
            }
            Err(err) => {
                warn!(
                    provider = %provider,
                    kind = ?err.kind,
                    error = %err,
                    "Failed to create live transport, using mock"
                );
                Transport::stand_in(provider, StandInReason::Mock)
            }
        }
    }

    pub fn stand_in(&self, provider: Provider, reason: StandInReason) -> Transport {
        Transport::stand_in(provider, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderCredentials;
    use crate::credentials::CredentialResolver;
    use crate::transport::MockMailTransport;

    fn resolved(config: &Arc<MailConfig>, provider: Provider) -> ResolvedCredentials {
        CredentialResolver::new(config.clone()).resolve(provider)
    }

    fn gmail_config() -> MailConfig {
        MailConfig::default()
            .with_credentials(Provider::Gmail, ProviderCredentials::new("me@gmail.com", "app-pass"))
    }

    #[test]
    fn test_force_stand_in_skips_connector() {
        let config = Arc::new(gmail_config().with_force_stand_in(true));
        let mut connector = MockConnector::new();
        connector.expect_connect().never();

        let factory = TransportFactory::with_connector(config.clone(), Arc::new(connector));
        let transport = factory.create(Provider::Gmail, &resolved(&config, Provider::Gmail));

        assert_eq!(transport.stand_in_reason(), Some(StandInReason::Mock));
    }

    #[test]
    fn test_unconfigured_is_credentials_unavailable() {
        let config = Arc::new(MailConfig::default());
        let mut connector = MockConnector::new();
        connector.expect_connect().never();

        let factory = TransportFactory::with_connector(config.clone(), Arc::new(connector));
        let transport = factory.create(Provider::SendGrid, &resolved(&config, Provider::SendGrid));

        assert_eq!(
            transport.stand_in_reason(),
            Some(StandInReason::CredentialsUnavailable)
        );
    }

    #[test]
    fn test_configured_uses_connector_with_provider_params() {
        let config = Arc::new(gmail_config());
        let mut connector = MockConnector::new();
        connector
            .expect_connect()
            .withf(|provider, params, creds| {
                *provider == Provider::Gmail
                    && params.host == "smtp.gmail.com"
                    && params.port == 587
                    && creds.configured
            })
            .times(1)
            .returning(|_, _, _| {
                let mut live = MockMailTransport::new();
                live.expect_name().return_const("fake-live");
                Ok(Arc::new(live) as Arc<dyn MailTransport>)
            });

        let factory = TransportFactory::with_connector(config.clone(), Arc::new(connector));
        let transport = factory.create(Provider::Gmail, &resolved(&config, Provider::Gmail));

        assert!(!transport.is_stand_in());
        assert_eq!(transport.name(), "fake-live");
    }

    #[test]
    fn test_connect_failure_falls_back_to_mock() {
        let config = Arc::new(gmail_config());
        let mut connector = MockConnector::new();
        connector
            .expect_connect()
            .returning(|_, _, _| Err(TransportError::connection("dns lookup failed")));

        let factory = TransportFactory::with_connector(config.clone(), Arc::new(connector));
        let transport = factory.create(Provider::Gmail, &resolved(&config, Provider::Gmail));

        assert_eq!(transport.stand_in_reason(), Some(StandInReason::Mock));
    }

    #[test]
    fn test_smtp_connector_builds_without_network() {
        let config = Arc::new(gmail_config());
        let params = config.connection_params(Provider::Gmail);
        let transport = SmtpConnector
            .connect(Provider::Gmail, &params, &resolved(&config, Provider::Gmail))
            .unwrap();
        assert_eq!(transport.name(), "smtp");
    }
}
