use std::sync::Arc;

use titlegate_core::VerificationEngine;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub engine: Arc<VerificationEngine>,
}
