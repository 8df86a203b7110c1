//! Development preview server for Quire.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - An outline endpoint returning the heading outline of each page
//! - A WebSocket endpoint pushing reloads to open previews
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quire_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source_dir: PathBuf::from("docs"),
//!         gather_headings_level: Some(2),
//!         live_reload_enabled: true,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (quire-server)
//!                        │
//!                        ├─► GET /api/outline/{path}
//!                        │       │
//!                        │       └─► quire-outline (front matter + outline)
//!                        │
//!                        └─► GET /ws/live-reload?url=...
//!                                │
//!                                ├─► ClientRegistry (one queue per client)
//!                                │
//!                                └─► LiveReloadManager ◄── notify
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub use error::ServerError;
pub use live_reload::{
    BroadcastReport, ClientId, ClientRegistry, ClientState, LiveReloadMessage, PreviewClient,
    RegisterError,
};
use quire_outline::resolve_threshold;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Documentation source directory.
    pub source_dir: PathBuf,
    /// Process-wide gather headings level (`None` means 1).
    pub gather_headings_level: Option<i64>,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Watch patterns for live reload.
    pub watch_patterns: Option<Vec<String>>,
    /// Quiet period before a change triggers a reload.
    pub debounce_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            source_dir: PathBuf::from("docs"),
            gather_headings_level: None,
            live_reload_enabled: false,
            watch_patterns: None,
            debounce_ms: live_reload::DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the heading level is out of range, the file watcher
/// cannot start, or the listener cannot bind.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Fail at startup rather than on every request.
    let threshold = resolve_threshold(None, config.gather_headings_level)?;

    let live_reload = if config.live_reload_enabled {
        let registry = Arc::new(ClientRegistry::new());
        let mut manager = live_reload::LiveReloadManager::new(
            config.source_dir.clone(),
            config.watch_patterns.clone(),
            registry,
        )
        .with_debounce_ms(config.debounce_ms);
        manager.start()?;
        Some(manager)
    } else {
        None
    };

    let state = Arc::new(AppState {
        source_dir: config.source_dir.clone(),
        gather_headings_level: config.gather_headings_level,
        live_reload,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        source_dir = %config.source_dir.display(),
        level = %threshold,
        live_reload = config.live_reload_enabled,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C, stopping server");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Quire config.
#[must_use]
pub fn server_config_from_quire_config(config: &quire_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.docs_resolved.source_dir.clone(),
        gather_headings_level: config.outline.gather_headings_level,
        live_reload_enabled: config.live_reload.enabled,
        watch_patterns: config.live_reload.watch_patterns.clone(),
        debounce_ms: config.live_reload.debounce_ms,
    }
}
