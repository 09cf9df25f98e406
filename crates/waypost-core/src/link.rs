//! Localized link tree produced by the hierarchy builder.
//!
//! A [`Link`] is one sitemap location: a rendered label and URL for a single
//! record under a single locale, plus the sub-forests built from the node's
//! configured children. The serializer flattens the tree; `children` keeps
//! the nested shape so other consumers can distinguish groups of children by
//! node type.

use serde::Serialize;
use serde_json::Value as Json;

/// One sitemap location entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Link {
    /// Rendered display label.
    pub label: String,
    /// Rendered URL (relative or absolute, per node options).
    pub url: String,
    /// One sub-forest per configured child node, in declaration order.
    /// Entries are kept even when a child produced no links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Vec<Link>>,
    /// Opaque rendered payload from the node's `data` mapping.
    #[serde(skip_serializing_if = "Json::is_null")]
    pub data: Json,
    /// Tree depth, starting at 1 for top-level nodes.
    pub level: u32,
    /// Locale this link was rendered under.
    pub lang: String,
    /// Rendered priority, empty when unconfigured.
    pub priority: String,
    /// Rendered last-modification value, empty when unconfigured.
    pub last_modified: String,
    /// Same-content references in the other available locales.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<Alternate>,
}

/// A same-content reference in a different locale attached to a [`Link`].
///
/// Never carries the owning link's own locale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Alternate {
    /// Rendered URL under the alternate locale.
    pub url: String,
    /// The alternate locale.
    pub lang: String,
}
