//! Narrative deconstruction API binary entry point.
//!
//! Logs go to stderr without ANSI colours, as text or JSON lines.
//!
//! Coverage is excluded because the main function binds a real socket and
//! waits for Ctrl-C.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use narrative_deconstruct::config::Config;
use narrative_deconstruct::server::HttpServer;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // .env may set LOG_LEVEL, so load it before the subscriber
    let _ = dotenvy::dotenv();

    init_tracing();

    tracing::info!("narrative-deconstruct starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        demo = config.use_dummy_data,
        execution = ?config.execution,
        timeout_ms = config.request_timeout_ms,
        structured_output = config.structured_output,
        "Configuration loaded"
    );

    let server = HttpServer::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    tracing::info!("narrative-deconstruct shutdown complete");
}
