//! Supported outbound providers and their static connection settings.
//!
//! Everything that differs between providers lives in [`ProviderSettings`];
//! the resolver and factory consult this table instead of branching on names.

use crate::error::{DispatchError, DispatchResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Outbound mail provider.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    /// Primary account, submitted over the account's own SMTP server.
    #[default]
    Gmail,
    /// SendGrid SMTP relay.
    SendGrid,
    /// Mailgun SMTP relay.
    Mailgun,
    /// Ethereal disposable inbox. Nothing is delivered; messages can be previewed.
    Ethereal,
}

impl Provider {
    pub const COUNT: usize = 4;

    /// Parse a provider token as sent by the web form (`gmail`, `sendgrid`, ...).
    pub fn from_token(token: &str) -> DispatchResult<Self> {
        token.trim().parse().map_err(|_| {
            let valid: Vec<String> = Provider::iter().map(|p| p.to_string()).collect();
            DispatchError::Validation(format!(
                "Invalid email provider: {}. Valid options are: {}",
                token,
                valid.join(", ")
            ))
        })
    }

    /// Dense index, used for per-provider slots.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn settings(self) -> &'static ProviderSettings {
        &SETTINGS[self.index()]
    }
}

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// Plain connection upgraded with STARTTLS (port 587).
    StartTls,
    /// TLS from the first byte (port 465).
    Implicit,
}

/// Static per-provider configuration row.
#[derive(Debug)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub display_name: &'static str,
    pub host: &'static str,
    pub port: u16,
    pub security: Security,
    /// Username the relay expects regardless of account (SendGrid wants `apikey`).
    pub fixed_username: Option<&'static str>,
    pub placeholder_users: &'static [&'static str],
    pub placeholder_secrets: &'static [&'static str],
    /// Base URL for human-viewable copies of sent messages.
    pub preview_base_url: Option<&'static str>,
}

impl ProviderSettings {
    pub fn supports_preview(&self) -> bool {
        self.preview_base_url.is_some()
    }
}

/// Shared Ethereal account used when no other test inbox is configured.
pub const ETHEREAL_DEFAULT_USER: &str = "colin.schroeder74@ethereal.email";
pub const ETHEREAL_DEFAULT_PASS: &str = "5bFmCwhK6F77dFx9dv";

// Indexed by `Provider::index`; order must match the enum.
static SETTINGS: [ProviderSettings; Provider::COUNT] = [
    ProviderSettings {
        provider: Provider::Gmail,
        display_name: "Gmail",
        host: "smtp.gmail.com",
        port: 587,
        security: Security::StartTls,
        fixed_username: None,
        placeholder_users: &["your-email@gmail.com", "your_gmail_user_here"],
        placeholder_secrets: &["your-app-password", "password123"],
        preview_base_url: None,
    },
    ProviderSettings {
        provider: Provider::SendGrid,
        display_name: "SendGrid",
        host: "smtp.sendgrid.net",
        port: 587,
        security: Security::StartTls,
        fixed_username: Some("apikey"),
        placeholder_users: &[],
        placeholder_secrets: &[
            "SG.yourApiKeyHere",
            "your-sendgrid-api-key",
            "your_sendgrid_api_key_here",
        ],
        preview_base_url: None,
    },
    ProviderSettings {
        provider: Provider::Mailgun,
        display_name: "Mailgun",
        host: "smtp.mailgun.org",
        port: 587,
        security: Security::StartTls,
        fixed_username: None,
        placeholder_users: &["postmaster@your-domain.mailgun.org", "your_mailgun_user_here"],
        placeholder_secrets: &[
            "your-mailgun-password",
            "your-mailgun-api-key",
            "your_mailgun_api_key_here",
        ],
        preview_base_url: None,
    },
    ProviderSettings {
        provider: Provider::Ethereal,
        display_name: "Ethereal",
        host: "smtp.ethereal.email",
        port: 587,
        security: Security::StartTls,
        fixed_username: None,
        placeholder_users: &[],
        placeholder_secrets: &[],
        preview_base_url: Some("https://ethereal.email/message"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_table_matches_enum_order() {
        for provider in Provider::iter() {
            assert_eq!(provider.settings().provider, provider);
        }
    }

    #[test]
    fn test_from_token_is_case_insensitive() {
        assert_eq!(Provider::from_token("gmail").unwrap(), Provider::Gmail);
        assert_eq!(Provider::from_token("SendGrid").unwrap(), Provider::SendGrid);
        assert_eq!(Provider::from_token(" MAILGUN ").unwrap(), Provider::Mailgun);
        assert_eq!(Provider::from_token("ethereal").unwrap(), Provider::Ethereal);
    }

    #[test]
    fn test_from_token_rejects_unknown() {
        let err = Provider::from_token("postmark").unwrap_err();
        assert!(matches!(err, DispatchError::Validation(_)));
        assert!(err.to_string().contains("gmail, sendgrid, mailgun, ethereal"));
    }

    #[test]
    fn test_display_uses_tokens() {
        assert_eq!(Provider::SendGrid.to_string(), "sendgrid");
        assert_eq!(Provider::default(), Provider::Gmail);
    }

    #[test]
    fn test_only_ethereal_offers_preview() {
        let with_preview: Vec<Provider> = Provider::iter()
            .filter(|p| p.settings().supports_preview())
            .collect();
        assert_eq!(with_preview, vec![Provider::Ethereal]);
    }
}
