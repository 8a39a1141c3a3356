use std::sync::Arc;

use crate::engine::provider::EngineProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide engine provider. The handle it memoizes on first use is
    /// shared by every request for the life of the process.
    pub provider: Arc<EngineProvider>,
}
