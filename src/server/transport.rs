//! HTTP transport.
//!
//! Binds a TCP listener and serves an axum router on it until a shutdown
//! future resolves. In-flight requests are allowed to finish.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::ServerError;

/// A bound HTTP listener.
#[derive(Debug)]
pub struct HttpTransport {
    listener: TcpListener,
}

impl HttpTransport {
    /// Bind `addr`, e.g. `0.0.0.0:8000` or `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { listener })
    }

    /// The address actually bound.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(|e| ServerError::Bind {
            addr: "<bound>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serve `router` until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Serve`] if the server stops abnormally.
    pub async fn serve<F>(self, router: Router, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve {
                message: e.to_string(),
            })
    }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}
