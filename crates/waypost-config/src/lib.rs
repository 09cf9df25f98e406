//! Configuration management for Waypost.
//!
//! Parses `waypost.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! The `site.base_url` value supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! ## Layout
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 7070
//!
//! [site]
//! base_url = "https://example.com"
//! sitemap = "default"
//!
//! [locales]
//! default = "en"
//! available = ["en", "fr"]
//!
//! [records]
//! path = "records.json"
//!
//! [[sitemaps.default.objects]]
//! type = "page"
//!
//! [transformers.page]
//! id = "{{id}}"
//! title = "{{title}}"
//! url = "{{url}}"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use waypost_core::{PresentError, Shape, SitemapConfig};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "waypost.toml";

/// `${VAR}` / `${VAR:-default}` expansion pattern.
static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(?<name>[A-Za-z_][A-Za-z0-9_]*)(?::-(?<default>[^}]*))?\}")
        .expect("invalid env var regex")
});

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the site base URL.
    pub base_url: Option<String>,
    /// Override the record store path.
    pub records_path: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Site configuration.
    pub site: SiteConfig,
    /// Locale configuration.
    pub locales: LocalesConfig,
    /// Record store configuration.
    pub records: RecordsConfig,
    /// Sitemap definitions, by identifier.
    pub sitemaps: SitemapConfig,
    /// Transformer shape declarations, by name.
    pub transformers: HashMap<String, toml::Value>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7070,
        }
    }
}

/// Site configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Base origin every sitemap URL is resolved against.
    pub base_url: String,
    /// Sitemap identifier served over HTTP.
    pub sitemap: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            sitemap: "default".to_owned(),
        }
    }
}

/// Locale configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocalesConfig {
    /// Locale used by nodes that opt out of localization.
    pub default: String,
    /// Full set of locales for localized nodes.
    pub available: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            default: "en".to_owned(),
            available: vec!["en".to_owned()],
        }
    }
}

/// Record store configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordsConfig {
    /// Path to the JSON record store, relative to the config file.
    pub path: PathBuf,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("records.json"),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),

    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., `site.base_url`).
        field: String,
        /// Error message (e.g., `${BASE_URL} not set`).
        message: String,
    },

    /// A transformer declaration failed to parse into a shape.
    #[error("Invalid transformer '{name}': {source}")]
    Transformer {
        /// Transformer name.
        name: String,
        /// Shape parse failure.
        source: PresentError,
    },
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `config_path` must exist; otherwise `waypost.toml` is
    /// discovered upward from the current directory, falling back to
    /// defaults when none is found. CLI settings apply last.
    ///
    /// # Errors
    ///
    /// Fails on a missing explicit file, unreadable or invalid TOML, failed
    /// environment expansion, or validation.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.expand_env_vars()?;
        config.validate()?;

        Ok(config)
    }

    /// The record store path, resolved relative to the config file.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        if self.records.path.is_absolute() {
            return self.records.path.clone();
        }
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(dir) => dir.join(&self.records.path),
            None => self.records.path.clone(),
        }
    }

    /// Parse the declared transformer shapes.
    ///
    /// # Errors
    ///
    /// Fails when a declaration has no shape interpretation (e.g. a TOML
    /// datetime).
    pub fn transformer_shapes(&self) -> Result<Vec<(String, Shape)>, ConfigError> {
        self.transformers
            .iter()
            .map(|(name, value)| {
                Shape::from_toml(value)
                    .map(|shape| (name.clone(), shape))
                    .map_err(|source| ConfigError::Transformer {
                        name: name.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Search for `waypost.toml` upward from the current directory.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Read and parse a config file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply CLI overrides.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(base_url) = &settings.base_url {
            self.site.base_url.clone_from(base_url);
        }
        if let Some(path) = &settings.records_path {
            self.records.path.clone_from(path);
        }
    }

    /// Expand environment variables in expandable fields.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.base_url = expand_value(&self.site.base_url, "site.base_url")?;
        Ok(())
    }

    /// Check invariants that serde cannot express.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.base_url cannot be empty".to_owned(),
            ));
        }
        if self.locales.available.is_empty() {
            return Err(ConfigError::Validation(
                "locales.available cannot be empty".to_owned(),
            ));
        }
        if !self.locales.available.contains(&self.locales.default) {
            return Err(ConfigError::Validation(format!(
                "locales.default '{}' is not in locales.available",
                self.locales.default
            )));
        }
        Ok(())
    }
}

/// Expand `${VAR}` / `${VAR:-default}` references in a value.
fn expand_value(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut error = None;
    let expanded = ENV_VAR.replace_all(value, |caps: &regex::Captures<'_>| {
        let name = &caps["name"];
        match std::env::var(name) {
            Ok(found) => found,
            Err(_) => match caps.name("default") {
                Some(default) => default.as_str().to_owned(),
                None => {
                    error = Some(ConfigError::EnvVar {
                        field: field.to_owned(),
                        message: format!("${{{name}}} not set"),
                    });
                    String::new()
                }
            },
        }
    });

    match error {
        Some(err) => Err(err),
        None => Ok(expanded.into_owned()),
    }
}
