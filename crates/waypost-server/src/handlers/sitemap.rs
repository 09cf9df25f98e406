//! Sitemap endpoint.
//!
//! Builds the configured sitemap on demand and returns the serialized XML.
//! Nothing is cached at this layer: every request is a full synchronous
//! build, with presentation contexts memoized one level down.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /sitemap.xml.
pub(crate) async fn get_sitemap(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let forest = state.builder.build(&state.sitemap_id)?;
    let xml = waypost_xml::serialize(&forest, state.builder.base_url())?;

    // An empty body would read as "zero links"; treat it as a failure.
    if xml.is_empty() {
        return Err(ServerError::EmptyDocument);
    }

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}
