//! Mail dispatch web service
//!
//! Serves the browser form endpoint and a small JSON API on top of
//! [`mail_dispatch::Dispatcher`].
//!
//! ## Routes
//!
//! - `POST /submit`: multipart form, sends one message
//! - `GET /api/health`: liveness with app name and version
//! - `GET /api/providers`: credential readiness per provider
//!
//! ## Configuration
//!
//! Environment variables, optionally from a `.env` file in the working
//! directory. See [`mail_dispatch::MailConfig`] for the provider settings and
//! [`core_config::server::ServerConfig`] for `HOST`/`PORT`.

use axum::Router;
use axum_helpers::{create_app, create_router};
use core_config::{AppInfo, tracing::init_tracing};
use eyre::{Result, WrapErr};
use mail_dispatch::{Dispatcher, Provider, Readiness};
use tracing::{info, warn};

pub mod api;
pub mod config;
pub mod error;
pub mod state;

use config::Config;
use state::AppState;

/// Provider whose transport is built before the first request.
pub const PRIMARY_PROVIDER: Provider = Provider::Gmail;

/// Full router: API under `/api`, form endpoint at the root.
pub fn app(dispatcher: Dispatcher, info: AppInfo) -> Router {
    let state = AppState::new(dispatcher);
    create_router(api::routes(&state, info), api::root_routes(&state))
}

fn log_provider_status(dispatcher: &Dispatcher) {
    for status in dispatcher.cache().resolver().status_report() {
        match status.readiness {
            Readiness::Ready => info!(
                provider = %status.provider,
                stand_in_forced = status.stand_in_forced,
                "Provider credentials configured"
            ),
            Readiness::Placeholder | Readiness::Missing => warn!(
                provider = %status.provider,
                readiness = ?status.readiness,
                "Provider credentials unavailable, sends will be simulated"
            ),
        }
    }
}

/// Run the service until SIGINT/SIGTERM.
///
/// 1. Loads `.env` (if present) and the environment configuration
/// 2. Sets up structured logging (JSON for prod, pretty for dev)
/// 3. Reports credential readiness and warms up the primary provider
/// 4. Serves HTTP with graceful shutdown
///
/// # Errors
///
/// Returns an error if the configuration cannot be parsed or the listener
/// cannot bind.
pub async fn run() -> Result<()> {
    // Missing .env is fine; the process environment still applies
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env().wrap_err("Failed to load configuration")?;

    init_tracing(&config.environment);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env file"),
        Err(err) if err.not_found() => info!("No .env file found, using process environment"),
        Err(err) => warn!(error = %err, "Ignoring unreadable .env file"),
    }

    info!(
        environment = ?config.environment,
        address = %config.server.address(),
        timeout_secs = config.mail.timeout.as_secs(),
        "Starting {} v{}",
        config.app.name,
        config.app.version
    );

    let dispatcher = Dispatcher::from_config(config.mail.clone());
    log_provider_status(&dispatcher);
    dispatcher.cache().warm_up(&[PRIMARY_PROVIDER]).await;

    let router = app(dispatcher, config.app);

    create_app(router, &config.server)
        .await
        .wrap_err("Server error")?;

    info!("Mailer shutdown complete");
    Ok(())
}
