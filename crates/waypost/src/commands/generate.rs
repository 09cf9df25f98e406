//! `waypost generate` command implementation.
//!
//! One-shot build: load configuration, build the sitemap, write the XML to
//! stdout or a file. Useful for static deployments and CI checks alongside
//! the on-demand HTTP endpoint.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use waypost_cache::{Cache, MemoryCache};
use waypost_config::{CliSettings, Config};
use waypost_core::{
    Locales, PlaceholderRenderer, Presenter, SitemapBuilder, TransformerRegistry,
};
use waypost_records::JsonStore;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to configuration file (default: auto-discover waypost.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sitemap identifier to build (default: the configured one).
    #[arg(short, long)]
    sitemap: Option<String>,

    /// Base origin for sitemap URLs (overrides config).
    #[arg(long, env = "WAYPOST_BASE_URL")]
    base_url: Option<String>,

    /// Write the XML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error on configuration, build, or serialization failure.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.base_url,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let builder = sitemap_builder(&config)?;
        let sitemap_id = self.sitemap.as_deref().unwrap_or(&config.site.sitemap);

        output.info(&format!("Building sitemap '{sitemap_id}'"));
        let forest = builder.build(sitemap_id)?;
        let xml = waypost_xml::serialize(&forest, builder.base_url())?;

        if xml.is_empty() {
            return Err(CliError::Validation(
                "serialization produced an empty document".to_owned(),
            ));
        }

        match self.output {
            Some(path) => {
                std::fs::write(&path, &xml)?;
                output.success(&format!("Wrote sitemap to {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(xml.as_bytes())?;
                stdout.write_all(b"\n")?;
            }
        }

        Ok(())
    }
}

/// Wire a sitemap builder from a loaded configuration.
fn sitemap_builder(config: &Config) -> Result<SitemapBuilder, CliError> {
    let store = JsonStore::from_path(&config.records_path())?;

    let mut registry = TransformerRegistry::new();
    for (name, shape) in config.transformer_shapes()? {
        registry.register_shape(name, shape);
    }

    let builder = SitemapBuilder::new(
        config.site.base_url.clone(),
        Arc::new(store),
        Presenter::new(registry, MemoryCache::new().bucket("contexts")),
        Arc::new(PlaceholderRenderer),
        Locales::new(
            config.locales.default.clone(),
            config.locales.available.clone(),
        ),
    )?
    .with_config(config.sitemaps.clone());

    Ok(builder)
}
