//! HTTP server for the Waypost sitemap engine.
//!
//! Serves a single endpoint:
//!
//! - `GET /sitemap.xml` — builds the configured sitemap on demand and
//!   returns the XML document
//!
//! A build is synchronous and either completes fully or fails the request;
//! there is no partial or cached response at this layer. Presentation
//! contexts are memoized across requests through the in-memory cache.
//!
//! # Quick Start
//!
//! ```ignore
//! use waypost_config::Config;
//! use waypost_server::{run_server, server_config_from_config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(None, None).unwrap();
//!     let server_config = server_config_from_config(&config).unwrap();
//!     run_server(server_config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use waypost_cache::{Cache, MemoryCache};
use waypost_core::{
    Locales, PlaceholderRenderer, Presenter, Shape, SitemapBuilder, SitemapConfig,
    TransformerRegistry,
};
use waypost_records::JsonStore;

use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Base origin for sitemap URLs.
    pub base_url: String,
    /// Sitemap identifier served at `/sitemap.xml`.
    pub sitemap_id: String,
    /// Path to the JSON record store.
    pub records_path: PathBuf,
    /// Locale set for localized nodes.
    pub locales: Locales,
    /// Sitemap definitions.
    pub sitemaps: SitemapConfig,
    /// Parsed transformer shapes, by name.
    pub transformers: Vec<(String, Shape)>,
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the record store cannot be loaded, the builder
/// rejects its configuration, or the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonStore::from_path(&config.records_path)?;

    let mut registry = TransformerRegistry::new();
    for (name, shape) in config.transformers {
        registry.register_shape(name, shape);
    }

    let cache = MemoryCache::new();
    let builder = SitemapBuilder::new(
        config.base_url,
        Arc::new(store),
        Presenter::new(registry, cache.bucket("contexts")),
        Arc::new(PlaceholderRenderer),
        config.locales,
    )?
    .with_config(config.sitemaps);

    let state = Arc::new(AppState {
        builder,
        sitemap_id: config.sitemap_id,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from a loaded Waypost config.
///
/// # Errors
///
/// Fails when a declared transformer shape does not parse.
pub fn server_config_from_config(
    config: &waypost_config::Config,
) -> Result<ServerConfig, waypost_config::ConfigError> {
    Ok(ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        base_url: config.site.base_url.clone(),
        sitemap_id: config.site.sitemap.clone(),
        records_path: config.records_path(),
        locales: Locales::new(
            config.locales.default.clone(),
            config.locales.available.clone(),
        ),
        sitemaps: config.sitemaps.clone(),
        transformers: config.transformer_shapes()?,
    })
}
