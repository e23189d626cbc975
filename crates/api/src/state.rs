use std::sync::Arc;

use crate::auth::jwt::AccessTokens;
use crate::config::ServerConfig;

/// Handler state, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub pool: tracker_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Access-token signer/verifier, keyed from `config.jwt`.
    pub tokens: Arc<AccessTokens>,
}

impl AppState {
    pub fn new(pool: tracker_db::DbPool, config: ServerConfig) -> Self {
        let tokens = Arc::new(AccessTokens::new(&config.jwt));
        Self {
            pool,
            config: Arc::new(config),
            tokens,
        }
    }
}
