//! `waypost serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use waypost_config::{CliSettings, Config};
use waypost_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover waypost.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Base origin for sitemap URLs (overrides config).
    #[arg(long, env = "WAYPOST_BASE_URL")]
    base_url: Option<String>,

    /// Path to the JSON record store (overrides config).
    #[arg(long)]
    records: Option<PathBuf>,

    /// Enable verbose output (show request and build logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            base_url: self.base_url,
            records_path: self.records,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let server_config = server_config_from_config(&config)?;

        output.highlight(&format!(
            "Serving sitemap at http://{}:{}/sitemap.xml",
            server_config.host, server_config.port
        ));

        run_server(server_config)
            .await
            .map_err(|err| CliError::Server(err.to_string()))
    }
}
