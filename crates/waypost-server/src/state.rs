//! Application state.
//!
//! Shared state for all request handlers.

use waypost_core::SitemapBuilder;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Sitemap builder, safe to share: every build call is `&self`.
    pub(crate) builder: SitemapBuilder,
    /// Sitemap identifier served over HTTP.
    pub(crate) sitemap_id: String,
}
