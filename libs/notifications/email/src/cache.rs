//! Process-wide, provider-keyed transport cache.
//!
//! Each provider gets one [`OnceCell`]. The first caller resolves credentials,
//! builds and verifies the transport; concurrent first callers await that same
//! construction and every later caller gets the stored handle. Nothing is ever
//! evicted or re-verified.

use crate::config::MailConfig;
use crate::credentials::CredentialResolver;
use crate::factory::{Connector, SmtpConnector, TransportFactory};
use crate::models::StandInReason;
use crate::provider::Provider;
use crate::transport::Transport;
use crate::verifier::ConnectivityVerifier;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

pub struct TransportCache {
    resolver: CredentialResolver,
    factory: TransportFactory,
    verifier: ConnectivityVerifier,
    slots: [OnceCell<Arc<Transport>>; Provider::COUNT],
}

impl TransportCache {
    pub fn new(config: Arc<MailConfig>) -> Self {
        Self::with_connector(config, Arc::new(SmtpConnector))
    }

    pub fn with_connector(config: Arc<MailConfig>, connector: Arc<dyn Connector>) -> Self {
        Self {
            resolver: CredentialResolver::new(config.clone()),
            verifier: ConnectivityVerifier::new(config.timeout),
            factory: TransportFactory::with_connector(config, connector),
            slots: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Transport for `provider`, building it on first use.
    pub async fn get_transport(&self, provider: Provider) -> Arc<Transport> {
        self.slots[provider.index()]
            .get_or_init(|| self.build(provider))
            .await
            .clone()
    }

    /// Already-built transport, without triggering construction.
    pub fn cached(&self, provider: Provider) -> Option<Arc<Transport>> {
        self.slots[provider.index()].get().cloned()
    }

    pub fn is_initialized(&self, provider: Provider) -> bool {
        self.slots[provider.index()].initialized()
    }

    /// Build transports ahead of the first request.
    pub async fn warm_up(&self, providers: &[Provider]) {
        for &provider in providers {
            let transport = self.get_transport(provider).await;
            info!(
                provider = %provider,
                stand_in = ?transport.stand_in_reason(),
                "Transport ready"
            );
        }
    }

    #[instrument(skip(self), fields(provider = %provider))]
    async fn build(&self, provider: Provider) -> Arc<Transport> {
        let credentials = self.resolver.resolve(provider);
        let transport = self.factory.create(provider, &credentials);

        if transport.is_stand_in() {
            return Arc::new(transport);
        }

        match self.verifier.verify(&transport).await {
            Ok(()) => Arc::new(transport),
            Err(err) => {
                warn!(
                    kind = ?err.kind,
                    "Live transport unusable, falling back to mock for the rest of the process"
                );
                Arc::new(self.factory.stand_in(provider, StandInReason::Mock))
            }
        }
    }
}
