//! Declarative sitemap configuration model.
//!
//! A [`SitemapConfig`] maps sitemap identifiers to [`RootNode`]s; each root
//! declares cascade overrides and an ordered list of [`ObjectNode`]s, nested
//! recursively through `children`. The model deserializes straight from the
//! `[sitemaps]` section of `waypost.toml`:
//!
//! ```toml
//! [sitemaps.default]
//! l10n = true
//!
//! [[sitemaps.default.objects]]
//! type = "page"
//! label = "{{title}}"
//! url = "{{url}}"
//!
//! [[sitemaps.default.objects.children]]
//! type = "article"
//! condition = "{{has_articles}}"
//! ```

use std::collections::HashMap;

use serde::Deserialize;

/// All configured sitemaps, by identifier.
pub type SitemapConfig = HashMap<String, RootNode>;

/// One sitemap definition.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RootNode {
    /// Cascade override: localize nodes across all available locales.
    pub l10n: Option<bool>,
    /// Cascade override: locale used when `l10n` is off.
    pub locale: Option<String>,
    /// Cascade override: skip records whose route is inactive.
    pub check_active_routes: Option<bool>,
    /// Cascade override: keep rendered URLs as-is instead of rewriting them
    /// onto the base origin.
    pub relative_urls: Option<bool>,
    /// Top-level object nodes, in declaration order.
    pub objects: Vec<ObjectNode>,
}

/// One object-type node of the hierarchy.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectNode {
    /// Record type to collect.
    #[serde(rename = "type")]
    pub record_type: String,
    /// Label template; defaults to `"{{title}}"`.
    pub label: Option<String>,
    /// URL template; defaults to `"{{url}}"`.
    pub url: Option<String>,
    /// Filter criteria tables, leaf strings rendered against the parent
    /// context before use.
    #[serde(default)]
    pub filters: Vec<toml::Value>,
    /// Order criteria tables, treated like `filters`.
    #[serde(default)]
    pub orders: Vec<toml::Value>,
    /// Child nodes, one per child record type, in declaration order.
    #[serde(default)]
    pub children: Vec<ObjectNode>,
    /// Skip the node (and subtree) when this template renders falsy against
    /// the parent context.
    pub condition: Option<String>,
    /// Arbitrary payload templates, rendered per record.
    #[serde(default)]
    pub data: toml::Table,
    /// Sitemap priority template.
    pub priority: Option<String>,
    /// Last-modification template.
    pub last_modified: Option<String>,
    /// Transformer name; defaults to the record type.
    pub transformer: Option<String>,
    /// Cascading flag overrides (see [`RootNode`]).
    pub l10n: Option<bool>,
    /// Cascading locale override.
    pub locale: Option<String>,
    /// Cascading route-activity override.
    pub check_active_routes: Option<bool>,
    /// Cascading URL-form override.
    pub relative_urls: Option<bool>,
}
