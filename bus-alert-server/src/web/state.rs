//! Application state for the web layer.

use std::sync::Arc;

use crate::registry::ManagerRegistry;

/// Shared application state.
pub struct AppState<S> {
    /// Every configured entry's poller
    pub registry: Arc<ManagerRegistry<S>>,
}

impl<S> AppState<S> {
    pub fn new(registry: Arc<ManagerRegistry<S>>) -> Self {
        Self { registry }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}
