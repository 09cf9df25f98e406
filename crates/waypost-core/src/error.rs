//! Error types for the builder and presenter pipeline.

/// Error from a sitemap build.
///
/// A build either completes fully or fails with one of these; there is no
/// partial output.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The requested sitemap identifier is not defined.
    #[error("sitemap '{0}' is not defined")]
    UnknownSitemap(String),

    /// The sitemap defines no objects to collect.
    #[error("no objects defined in sitemap '{0}'")]
    NoObjects(String),

    /// The builder was constructed without a usable base URL.
    #[error("base URL must not be empty")]
    MissingBaseUrl,

    /// Record source failure; fatal for the whole build.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Error from transform-shape handling.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    /// A declared transform shape has no supported interpretation.
    #[error("unsupported transform shape: {0}")]
    UnsupportedShape(String),
}

/// Error from a [`RecordSource`](crate::record::RecordSource) implementation.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The queried record type does not exist in the store.
    #[error("unknown record type '{0}'")]
    UnknownType(String),

    /// I/O failure while reading the store.
    #[error("record store I/O error")]
    Io(#[from] std::io::Error),

    /// The store's contents could not be parsed.
    #[error("record store parse error")]
    Parse(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("{0}")]
    Backend(String),
}
