//! Development server for nibl.
//!
//! Serves the generated site, rebuilds it when sources change and tells
//! open browser tabs to reload.
//!
//! # Quick Start
//!
//! ```ignore
//! use nibl_server::{ServerConfig, run_server};
//!
//! let config = ServerConfig::default();
//! run_server(config, || build(true), || build(false)).await?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! notify ──events──► Scheduler ──rebuild──► output dir
//!                        │                      │
//!                        └─broadcast──► Hub     └──► ServeDir ──► inject script ──► Browser
//!                                        │                                            │
//!                                        └──────────── "reload" over /ws ◄────────────┘
//! ```

mod app;
pub mod live_reload;
pub mod middleware;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub use app::create_router;
pub use live_reload::{BoxError, Hub, Rebuild, ReloadHub, Scheduler, Timing, WatchRoots, WatchSet};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Generated site served over HTTP.
    pub output_dir: PathBuf,
    /// Sources watched for changes.
    pub watch: WatchRoots,
    pub timing: Timing,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 1313,
            output_dir: PathBuf::from("public"),
            watch: WatchRoots::default(),
            timing: Timing::default(),
        }
    }
}

/// Server startup error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Initial build failed: {0}")]
    InitialBuild(#[source] BoxError),

    #[error("Failed to start file watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the site, then watch, rebuild and serve until Ctrl-C.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `initial_build` - First build; expected to clean the output directory
/// * `rebuild` - Build run for every accepted change; must not clean
///
/// # Errors
///
/// Returns [`ServerError`] if the initial build fails, the watcher cannot be
/// started or the address cannot be bound.
pub async fn run_server<I, R>(
    config: ServerConfig,
    initial_build: I,
    rebuild: R,
) -> Result<(), ServerError>
where
    I: FnOnce() -> Result<usize, BoxError>,
    R: Rebuild,
{
    let pages = initial_build().map_err(ServerError::InitialBuild)?;
    tracing::info!(pages, "Initial build complete");

    let hub = Arc::new(ReloadHub::new());
    let (watch, events) = WatchSet::start(&config.watch)?;
    let scheduler = Scheduler::new(rebuild, Arc::clone(&hub), config.timing).with_watch_set(watch);
    tokio::spawn(scheduler.run(events));

    let app = create_router(hub, &config.output_dir);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(address = %addr, "Serving at http://{addr}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
