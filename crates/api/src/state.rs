use std::sync::Arc;

use authgate_core::RotationEngine;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Issue/refresh/logout protocol over the configured session store.
    pub engine: Arc<RotationEngine>,
}
