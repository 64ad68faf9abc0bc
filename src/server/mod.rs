//! HTTP server implementation.
//!
//! This module provides:
//! - Shared state and the live/demo analysis backend
//! - The axum router with optional bearer-token gate
//! - TCP transport with graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use narrative_deconstruct::config::Config;
//! use narrative_deconstruct::server::HttpServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     use_dummy_data: true,
//!     ..Config::default()
//! };
//! HttpServer::new(config).run().await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod routes;
mod transport;
mod types;

pub use app::HttpServer;
pub use routes::{router, ApiError};
pub use transport::{shutdown_signal, HttpTransport};
pub use types::{
    AnalysisService, AppState, ErrorDetail, HealthResponse, LivePipeline, SynthesisRequest,
    HEALTH_MESSAGE,
};
