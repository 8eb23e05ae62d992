use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use eyre::WrapErr;
use mail_dispatch::MailConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env().wrap_err("Invalid HOST/PORT")?; // HOST=0.0.0.0, PORT=3000
        let mail = MailConfig::from_env().wrap_err("Invalid mail provider settings")?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            mail,
        })
    }
}
