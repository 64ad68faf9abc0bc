//! Main HTTP server orchestration.

use tracing::info;

use super::routes::router;
use super::transport::{shutdown_signal, HttpTransport};
use super::types::AppState;
use crate::config::Config;
use crate::error::AppError;

/// Main server that wires configuration, analysis backend and transport.
#[derive(Debug)]
pub struct HttpServer {
    config: Config,
}

impl HttpServer {
    /// Creates a new server with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the server until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the analysis backend cannot be built from the configuration
    /// - the listen address cannot be bound
    /// - the server stops abnormally
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self) -> Result<(), AppError> {
        let state = AppState::from_config(&self.config)?;
        let mode = state.service.mode();
        let gated = state.access_token.is_some();

        let transport = HttpTransport::bind(&self.config.listen_addr()).await?;
        info!(
            addr = %transport.local_addr()?,
            mode,
            gated,
            model = %self.config.model,
            "Narrative deconstruction API listening"
        );

        transport.serve(router(state), shutdown_signal()).await?;

        info!("Server stopped");
        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
