//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use waypost_core::BuildError;
use waypost_xml::SitemapXmlError;

/// Server error type.
///
/// Every variant is a whole-request failure: a sitemap is either fully
/// built and serialized or the request fails.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Sitemap build failure.
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// XML serialization failure.
    #[error("Serialization error: {0}")]
    Xml(#[from] SitemapXmlError),

    /// Serialization produced an empty document.
    #[error("Serialization produced an empty document")]
    EmptyDocument,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "sitemap request failed");

        let body = match &self {
            Self::Build(e) => json!({"error": "Sitemap build failed", "detail": e.to_string()}),
            Self::Xml(e) => {
                json!({"error": "Sitemap serialization failed", "detail": e.to_string()})
            }
            Self::EmptyDocument => json!({"error": "Sitemap serialization produced no document"}),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_maps_to_internal_error() {
        let response =
            ServerError::Build(BuildError::UnknownSitemap("nope".to_owned())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
