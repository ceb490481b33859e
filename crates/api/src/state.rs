use std::sync::Arc;

use crate::config::ServerConfig;
use crate::providers::Providers;

/// Handler state. Clones share the pool, config and provider clients.
#[derive(Clone)]
pub struct AppState {
    pub pool: tama_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Image, conversation and payment collaborators.
    pub providers: Providers,
}
