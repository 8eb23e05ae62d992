//! Credential resolution: is a provider usable with what was configured?

use crate::config::MailConfig;
use crate::provider::Provider;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::debug;

/// State of a single credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Missing,
    Placeholder,
    Present,
}

/// Overall readiness of a provider, worst field wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Ready,
    Placeholder,
    Missing,
}

/// Outcome of resolving one provider's credentials.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub provider: Provider,
    /// `true` only when every required field is present and not a placeholder.
    pub configured: bool,
    pub readiness: Readiness,
    pub user: Option<String>,
    secret: Option<String>,
    pub domain: Option<String>,
}

impl ResolvedCredentials {
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("provider", &self.provider)
            .field("configured", &self.configured)
            .field("readiness", &self.readiness)
            .field("user", &self.user.as_deref().map(user_hint))
            .field("secret", &self.secret.as_deref().map(secret_hint))
            .field("domain", &self.domain)
            .finish()
    }
}

/// One row of the startup readiness report.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    pub readiness: Readiness,
    pub stand_in_forced: bool,
}

/// Decides, per provider, whether the configured credentials are usable.
///
/// Pure function of the configuration snapshot it was built with.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    config: Arc<MailConfig>,
}

impl CredentialResolver {
    pub fn new(config: Arc<MailConfig>) -> Self {
        Self { config }
    }

    pub fn resolve(&self, provider: Provider) -> ResolvedCredentials {
        resolve_with(&self.config, provider)
    }

    /// Readiness of every provider, for startup logging and health output.
    pub fn status_report(&self) -> Vec<ProviderStatus> {
        self.config.provider_status()
    }
}

impl MailConfig {
    /// Configured / placeholder / missing, per provider.
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        Provider::iter()
            .map(|provider| ProviderStatus {
                provider,
                readiness: resolve_with(self, provider).readiness,
                stand_in_forced: self.force_stand_in,
            })
            .collect()
    }
}

fn resolve_with(config: &MailConfig, provider: Provider) -> ResolvedCredentials {
    let settings = provider.settings();
    let raw = config.credentials(provider);

    let user = match settings.fixed_username {
        Some(fixed) => Some(fixed.to_string()),
        None => trimmed(raw.user.as_deref()),
    };
    let secret = trimmed(raw.secret.as_deref());

    let user_state = field_state(user.as_deref(), settings.placeholder_users);
    let secret_state = field_state(secret.as_deref(), settings.placeholder_secrets);

    let readiness = match (user_state, secret_state) {
        (FieldState::Present, FieldState::Present) => Readiness::Ready,
        (FieldState::Missing, _) | (_, FieldState::Missing) => Readiness::Missing,
        _ => Readiness::Placeholder,
    };

    debug!(
        provider = %provider,
        has_user = user.is_some(),
        has_secret = secret.is_some(),
        user_hint = %user.as_deref().map(user_hint).unwrap_or_default(),
        secret_hint = %secret.as_deref().map(secret_hint).unwrap_or_default(),
        ?readiness,
        "Resolved provider credentials"
    );

    ResolvedCredentials {
        provider,
        configured: readiness == Readiness::Ready,
        readiness,
        user,
        secret,
        domain: trimmed(raw.domain.as_deref()),
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn field_state(value: Option<&str>, placeholders: &[&str]) -> FieldState {
    match value {
        None => FieldState::Missing,
        Some(v) if placeholders.contains(&v) => FieldState::Placeholder,
        Some(_) => FieldState::Present,
    }
}

/// First four characters of a username, enough to tell accounts apart in logs.
pub fn user_hint(user: &str) -> String {
    let prefix: String = user.chars().take(4).collect();
    format!("{}...", prefix)
}

/// Length only; secrets are never echoed.
pub fn secret_hint(secret: &str) -> String {
    format!("{} chars", secret.chars().count())
}
