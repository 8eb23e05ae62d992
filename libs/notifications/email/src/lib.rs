//! Outbound mail dispatch over several SMTP providers
//!
//! A message is validated, routed to the transport for the requested provider
//! and sent. Transports are created lazily, verified once, and cached for the
//! rest of the process. Providers without usable credentials get a stand-in
//! transport that accepts everything without touching the network, so callers
//! always get a [`DeliveryResult`] that says whether delivery was real.
//!
//! ## Components
//!
//! - **Configuration**: [`MailConfig`] read once from the environment
//! - **Credentials**: [`CredentialResolver`] decides if a provider is usable
//! - **Transports**: live SMTP via lettre, or a [`StandInTransport`]
//! - **Cache**: [`TransportCache`], one single-flight slot per provider
//! - **Dispatch**: [`Dispatcher`], validation and result normalization
//!
//! ## Usage
//!
//! ```ignore
//! use core_config::FromEnv;
//! use mail_dispatch::{Dispatcher, MailConfig, Message, Provider};
//!
//! let dispatcher = Dispatcher::from_config(MailConfig::from_env()?);
//! let message = Message::new("someone@example.com", "Hello", "Plain text body");
//! let result = dispatcher.send(&message, Provider::Ethereal).await?;
//! println!("{:?}", result.preview_url);
//! ```

pub mod cache;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod models;
pub mod provider;
pub mod transport;
pub mod verifier;

pub use cache::TransportCache;
pub use config::{ConnectionParams, MailConfig, ProviderCredentials};
pub use credentials::{CredentialResolver, ProviderStatus, Readiness, ResolvedCredentials};
pub use dispatcher::{Dispatcher, STAND_IN_SENDER};
pub use error::{
    DispatchError, DispatchResult, ErrorKind, StatusHint, TransportError, TransportErrorKind,
};
pub use factory::{Connector, SmtpConnector, TransportFactory};
pub use models::{Attachment, DeliveryResult, Message, StandInReason};
pub use provider::{Provider, ProviderSettings, Security};
pub use transport::{MailTransport, SmtpMailTransport, StandInTransport, Transport, TransportReceipt};
pub use verifier::ConnectivityVerifier;
