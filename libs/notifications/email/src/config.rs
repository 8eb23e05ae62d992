//! Mail configuration snapshot, read once at startup.

use crate::provider::{Provider, Security, ETHEREAL_DEFAULT_PASS, ETHEREAL_DEFAULT_USER};
use core_config::{env_flag, env_optional, env_or_default, env_parse_or, ConfigError, FromEnv};
use std::fmt;
use std::time::Duration;

/// Default bound on SMTP handshakes and sends.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw credential fields for one provider, exactly as configured.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub user: Option<String>,
    pub secret: Option<String>,
    pub domain: Option<String>,
    /// Explicit default sender for this provider.
    pub from_email: Option<String>,
}

impl ProviderCredentials {
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from_email: impl Into<String>) -> Self {
        self.from_email = Some(from_email.into());
        self
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("user", &self.user)
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("domain", &self.domain)
            .field("from_email", &self.from_email)
            .finish()
    }
}

/// Host, port and security mode for a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub security: Security,
    pub timeout: Duration,
}

/// Per-provider credentials plus global switches.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub gmail: ProviderCredentials,
    pub sendgrid: ProviderCredentials,
    pub mailgun: ProviderCredentials,
    pub ethereal: ProviderCredentials,
    /// Primary-account SMTP server; the relays use fixed hosts.
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Implicit TLS instead of STARTTLS for the primary account.
    pub smtp_secure: bool,
    /// Skip live transports for every provider.
    pub force_stand_in: bool,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        let gmail = Provider::Gmail.settings();
        Self {
            gmail: ProviderCredentials::default(),
            sendgrid: ProviderCredentials::default(),
            mailgun: ProviderCredentials::default(),
            ethereal: ProviderCredentials::new(ETHEREAL_DEFAULT_USER, ETHEREAL_DEFAULT_PASS),
            smtp_host: gmail.host.to_string(),
            smtp_port: gmail.port,
            smtp_secure: false,
            force_stand_in: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl MailConfig {
    pub fn credentials(&self, provider: Provider) -> &ProviderCredentials {
        match provider {
            Provider::Gmail => &self.gmail,
            Provider::SendGrid => &self.sendgrid,
            Provider::Mailgun => &self.mailgun,
            Provider::Ethereal => &self.ethereal,
        }
    }

    pub fn with_credentials(mut self, provider: Provider, credentials: ProviderCredentials) -> Self {
        match provider {
            Provider::Gmail => self.gmail = credentials,
            Provider::SendGrid => self.sendgrid = credentials,
            Provider::Mailgun => self.mailgun = credentials,
            Provider::Ethereal => self.ethereal = credentials,
        }
        self
    }

    pub fn with_force_stand_in(mut self, force: bool) -> Self {
        self.force_stand_in = force;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sender used when a message does not name one.
    ///
    /// - gmail: the account user
    /// - sendgrid: `SENDGRID_FROM_EMAIL`, else the primary account user
    /// - mailgun: `MAILGUN_FROM_EMAIL`, else the mailgun user
    /// - ethereal: the test account user
    pub fn default_sender(&self, provider: Provider) -> Option<String> {
        let candidates = match provider {
            Provider::Gmail => [self.gmail.from_email.as_ref(), self.gmail.user.as_ref()],
            Provider::SendGrid => [self.sendgrid.from_email.as_ref(), self.gmail.user.as_ref()],
            Provider::Mailgun => [self.mailgun.from_email.as_ref(), self.mailgun.user.as_ref()],
            Provider::Ethereal => [self.ethereal.from_email.as_ref(), self.ethereal.user.as_ref()],
        };

        candidates
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn connection_params(&self, provider: Provider) -> ConnectionParams {
        let settings = provider.settings();
        match provider {
            Provider::Gmail => ConnectionParams {
                host: self.smtp_host.clone(),
                port: self.smtp_port,
                security: if self.smtp_secure {
                    Security::Implicit
                } else {
                    Security::StartTls
                },
                timeout: self.timeout,
            },
            _ => ConnectionParams {
                host: settings.host.to_string(),
                port: settings.port,
                security: settings.security,
                timeout: self.timeout,
            },
        }
    }
}

impl FromEnv for MailConfig {
    /// Reads:
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_SECURE`, `SMTP_USER`, `SMTP_PASS`
    /// - `SENDGRID_API_KEY`, `SENDGRID_FROM_EMAIL`
    /// - `MAILGUN_USER`, `MAILGUN_API_KEY`, `MAILGUN_DOMAIN`, `MAILGUN_FROM_EMAIL`
    /// - `ETHEREAL_USER`, `ETHEREAL_PASS` (default to the shared test account)
    /// - `USE_MOCK_TRANSPORT`, `MAIL_TIMEOUT_SECS`
    fn from_env() -> Result<Self, ConfigError> {
        let gmail_defaults = Provider::Gmail.settings();

        let timeout_secs = env_parse_or("MAIL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            gmail: ProviderCredentials {
                user: env_optional("SMTP_USER"),
                secret: env_optional("SMTP_PASS"),
                domain: None,
                from_email: None,
            },
            sendgrid: ProviderCredentials {
                user: None,
                secret: env_optional("SENDGRID_API_KEY"),
                domain: None,
                from_email: env_optional("SENDGRID_FROM_EMAIL"),
            },
            mailgun: ProviderCredentials {
                user: env_optional("MAILGUN_USER"),
                secret: env_optional("MAILGUN_API_KEY"),
                domain: env_optional("MAILGUN_DOMAIN"),
                from_email: env_optional("MAILGUN_FROM_EMAIL"),
            },
            ethereal: ProviderCredentials {
                user: Some(env_or_default("ETHEREAL_USER", ETHEREAL_DEFAULT_USER)),
                secret: Some(env_or_default("ETHEREAL_PASS", ETHEREAL_DEFAULT_PASS)),
                domain: None,
                from_email: None,
            },
            smtp_host: env_or_default("SMTP_HOST", gmail_defaults.host),
            smtp_port: env_parse_or("SMTP_PORT", gmail_defaults.port)?,
            smtp_secure: env_flag("SMTP_SECURE"),
            force_stand_in: env_flag("USE_MOCK_TRANSPORT"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIL_VARS: [&str; 15] = [
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_SECURE",
        "SMTP_USER",
        "SMTP_PASS",
        "SENDGRID_API_KEY",
        "SENDGRID_FROM_EMAIL",
        "MAILGUN_USER",
        "MAILGUN_API_KEY",
        "MAILGUN_DOMAIN",
        "MAILGUN_FROM_EMAIL",
        "ETHEREAL_USER",
        "ETHEREAL_PASS",
        "USE_MOCK_TRANSPORT",
        "MAIL_TIMEOUT_SECS",
    ];

    /// Every mail variable unset except the given overrides.
    fn mail_vars(
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, Option<&'static str>)> {
        MAIL_VARS
            .iter()
            .map(|key| {
                let value = overrides.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
                (*key, value)
            })
            .collect()
    }

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(mail_vars(&[]), || {
            let config = MailConfig::from_env().unwrap();
            assert_eq!(config.smtp_host, "smtp.gmail.com");
            assert_eq!(config.smtp_port, 587);
            assert!(!config.smtp_secure);
            assert!(!config.force_stand_in);
            assert_eq!(config.timeout, Duration::from_secs(30));
            assert!(config.gmail.user.is_none());
            assert_eq!(config.ethereal.user.as_deref(), Some(ETHEREAL_DEFAULT_USER));
        });
    }

    #[test]
    fn test_from_env_reads_provider_fields() {
        let vars = mail_vars(&[
            ("SMTP_USER", "me@gmail.com"),
            ("SMTP_PASS", "app-pass"),
            ("SMTP_SECURE", "true"),
            ("SMTP_PORT", "465"),
            ("MAILGUN_DOMAIN", "mg.example.com"),
            ("USE_MOCK_TRANSPORT", "true"),
            ("MAIL_TIMEOUT_SECS", "5"),
        ]);

        temp_env::with_vars(vars, || {
            let config = MailConfig::from_env().unwrap();
            assert_eq!(config.gmail.user.as_deref(), Some("me@gmail.com"));
            assert_eq!(config.mailgun.domain.as_deref(), Some("mg.example.com"));
            assert!(config.force_stand_in);
            assert_eq!(config.timeout, Duration::from_secs(5));

            let params = config.connection_params(Provider::Gmail);
            assert_eq!(params.port, 465);
            assert_eq!(params.security, Security::Implicit);
        });
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        temp_env::with_vars(mail_vars(&[("SMTP_PORT", "smtp")]), || {
            let err = MailConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("SMTP_PORT"));
        });
    }

    #[test]
    fn test_default_sender_fallbacks() {
        let config = MailConfig::default()
            .with_credentials(Provider::Gmail, ProviderCredentials::new("me@gmail.com", "x"))
            .with_credentials(
                Provider::Mailgun,
                ProviderCredentials::new("postmaster@mg.example.com", "key"),
            );

        assert_eq!(config.default_sender(Provider::Gmail).as_deref(), Some("me@gmail.com"));
        // SendGrid falls back to the primary account user
        assert_eq!(config.default_sender(Provider::SendGrid).as_deref(), Some("me@gmail.com"));
        assert_eq!(
            config.default_sender(Provider::Mailgun).as_deref(),
            Some("postmaster@mg.example.com")
        );
        assert_eq!(
            config.default_sender(Provider::Ethereal).as_deref(),
            Some(ETHEREAL_DEFAULT_USER)
        );
    }

    #[test]
    fn test_default_sender_prefers_explicit_from() {
        let config = MailConfig::default().with_credentials(
            Provider::SendGrid,
            ProviderCredentials {
                secret: Some("SG.real".into()),
                from_email: Some("news@example.com".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            config.default_sender(Provider::SendGrid).as_deref(),
            Some("news@example.com")
        );
    }

    #[test]
    fn test_default_sender_ignores_blank_values() {
        let config = MailConfig::default()
            .with_credentials(Provider::Gmail, ProviderCredentials::new("   ", "x"));
        assert!(config.default_sender(Provider::Gmail).is_none());
    }

    #[test]
    fn test_relays_use_fixed_hosts() {
        let config = MailConfig {
            smtp_host: "smtp.example.com".into(),
            ..Default::default()
        };
        assert_eq!(config.connection_params(Provider::SendGrid).host, "smtp.sendgrid.net");
        assert_eq!(config.connection_params(Provider::Mailgun).host, "smtp.mailgun.org");
        assert_eq!(config.connection_params(Provider::Gmail).host, "smtp.example.com");
    }

    #[test]
    fn test_debug_hides_secret() {
        let creds = ProviderCredentials::new("user@example.com", "super-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }
}
