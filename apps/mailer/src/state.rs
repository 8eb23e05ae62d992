//! Shared state handed to request handlers.

use mail_dispatch::Dispatcher;

/// Cloned per request; the dispatcher only holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}
