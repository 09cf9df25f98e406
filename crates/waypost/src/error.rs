//! CLI error types.

use waypost_config::ConfigError;
use waypost_core::{BuildError, RecordError};
use waypost_xml::SitemapXmlError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Record(#[from] RecordError),

    #[error("{0}")]
    Xml(#[from] SitemapXmlError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
