use std::sync::Arc;

use synapse_domain::config::Config;
use synapse_providers::ChatModel;
use synapse_sessions::HistoryStore;

/// Shared application state passed to all API handlers.
///
/// Built once at startup by [`crate::bootstrap::build_app_state`] and never
/// mutated afterwards; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// The resolved model handle, shared read-only by every request.
    pub model: Arc<dyn ChatModel>,
    pub history: Arc<dyn HistoryStore>,
}
