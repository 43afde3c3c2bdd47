use tokio::net::TcpListener;
use tracing::info;

use skein_sdk::Skein;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Skein HTTP server.
pub struct SkeinServer {
    config: ServerConfig,
    state: AppState,
}

impl SkeinServer {
    /// Open the configured data directory, or an in-memory instance when
    /// none is set.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let list_config = config.list_config()?;
        let skein = match &config.data_dir {
            Some(dir) => Skein::open_with(dir, list_config)?,
            None => Skein::in_memory_with(list_config)?,
        };
        Ok(Self::with_skein(config, skein))
    }

    pub fn with_skein(config: ServerConfig, skein: Skein) -> Self {
        Self {
            config,
            state: AppState::new(skein),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.cors)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            data_dir = ?self.config.data_dir,
            capacity = self.config.capacity,
            "skein server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
