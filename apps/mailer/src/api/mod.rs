use axum::{Json, Router, extract::State, routing::get};
use axum_helpers::health_router;
use core_config::AppInfo;
use mail_dispatch::ProviderStatus;

use crate::state::AppState;

pub mod submit;

/// Routes mounted under `/api` by `create_router`.
pub fn routes(state: &AppState, app: AppInfo) -> Router {
    Router::new()
        .route("/providers", get(providers))
        .with_state(state.clone())
        .merge(health_router(app))
}

/// Routes mounted at the root, where the browser form posts.
pub fn root_routes(state: &AppState) -> Router {
    submit::router(state.clone())
}

/// Credential readiness per provider. Never includes secrets.
async fn providers(State(state): State<AppState>) -> Json<Vec<ProviderStatus>> {
    Json(state.dispatcher.cache().resolver().status_report())
}
