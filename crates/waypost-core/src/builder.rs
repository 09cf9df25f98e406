//! Hierarchy builder.
//!
//! Expands a declarative [`SitemapConfig`] into a forest of localized
//! [`Link`] trees: one forest entry per top-level object node, one link per
//! (record, locale) pair, children nested per node declaration.
//!
//! Everything a recursion step needs — the resolved node, the parent
//! context, the depth — travels as parameters. The active locale in
//! particular is never ambient state: each rendering call below receives it
//! explicitly, so the alternate-link pass cannot leak one locale's setting
//! into another's output.

use std::sync::Arc;

use serde_json::Value as Json;

use crate::config::{ObjectNode, RootNode, SitemapConfig};
use crate::error::BuildError;
use crate::link::{Alternate, Link};
use crate::locale::Locales;
use crate::origin;
use crate::presenter::Presenter;
use crate::record::{Filter, MasterFilter, Order, Query, RecordSource};
use crate::render::TemplateRenderer;
use crate::value::{is_truthy, json_to_string, toml_to_json};

/// Builds localized link forests from a sitemap configuration.
pub struct SitemapBuilder {
    config: Option<SitemapConfig>,
    base_url: String,
    source: Arc<dyn RecordSource>,
    presenter: Presenter,
    renderer: Arc<dyn TemplateRenderer>,
    locales: Locales,
}

impl SitemapBuilder {
    /// Create a builder.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingBaseUrl`] when `base_url` is blank; the
    /// remaining dependencies are required by construction.
    pub fn new(
        base_url: impl Into<String>,
        source: Arc<dyn RecordSource>,
        presenter: Presenter,
        renderer: Arc<dyn TemplateRenderer>,
        locales: Locales,
    ) -> Result<Self, BuildError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(BuildError::MissingBaseUrl);
        }

        Ok(Self {
            config: None,
            base_url,
            source,
            presenter,
            renderer,
            locales,
        })
    }

    /// Attach the sitemap definitions to build from.
    #[must_use]
    pub fn with_config(mut self, config: SitemapConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the link forest for a sitemap.
    ///
    /// Returns an empty forest when no definitions were ever attached
    /// (nothing to build, not an error).
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownSitemap`] for an undefined identifier,
    /// [`BuildError::NoObjects`] for a definition without objects, and any
    /// record source failure.
    pub fn build(&self, sitemap_id: &str) -> Result<Vec<Vec<Link>>, BuildError> {
        let Some(config) = &self.config else {
            return Ok(Vec::new());
        };

        let root = config
            .get(sitemap_id)
            .ok_or_else(|| BuildError::UnknownSitemap(sitemap_id.to_owned()))?;
        if root.objects.is_empty() {
            return Err(BuildError::NoObjects(sitemap_id.to_owned()));
        }

        let cascade = Cascade::from_root(root, &self.locales.default);

        let mut forest = Vec::with_capacity(root.objects.len());
        for node in &root.objects {
            let resolved = ResolvedNode::resolve(node, &cascade);
            tracing::debug!(record_type = %resolved.record_type, "building object node");
            forest.push(self.build_object(&resolved, None, 1)?);
        }

        Ok(forest)
    }

    /// Build the links for one node: fetch records once, then emit one link
    /// per (locale, record), recursing into children with the record's
    /// presentation context as the new parent.
    fn build_object(
        &self,
        node: &ResolvedNode,
        parent: Option<&Json>,
        level: u32,
    ) -> Result<Vec<Link>, BuildError> {
        // Condition gate: the single pruning mechanism for the whole subtree.
        if let (Some(parent_context), Some(condition)) = (parent, node.condition.as_deref()) {
            if !is_truthy(&self.renderer.render(condition, parent_context)) {
                return Ok(Vec::new());
            }
        }

        let query = self.build_query(node, parent);
        let records = self.source.load(&query)?;

        let locales: Vec<&str> = if node.l10n {
            self.locales.available.iter().map(String::as_str).collect()
        } else {
            vec![node.locale.as_str()]
        };

        let mut out = Vec::new();
        for &locale in &locales {
            for record in &records {
                if node.check_active_routes && record.route_active(locale) == Some(false) {
                    continue;
                }

                let context =
                    self.presenter
                        .transform(record.as_ref(), node.transformer.as_deref(), locale);

                // One sub-forest slot per declared child, kept even when the
                // child was pruned to nothing.
                let mut children = Vec::with_capacity(node.children.len());
                for child in &node.children {
                    children.push(self.build_object(child, Some(&context), level + 1)?);
                }

                let mut alternates = Vec::new();
                for &other in &locales {
                    if other == locale {
                        continue;
                    }
                    // Each locale's activity is checked independently at the
                    // point of use.
                    if node.check_active_routes && record.route_active(other) == Some(false) {
                        continue;
                    }
                    let alt_context = self.presenter.transform(
                        record.as_ref(),
                        node.transformer.as_deref(),
                        other,
                    );
                    alternates.push(Alternate {
                        url: self.render_url(node, &alt_context),
                        lang: other.to_owned(),
                    });
                }

                out.push(Link {
                    label: self.renderer.render(&node.label, &context).trim().to_owned(),
                    url: self.render_url(node, &context),
                    children,
                    data: self.render_data(node, &context),
                    level,
                    lang: locale.to_owned(),
                    priority: self.render_optional(node.priority.as_deref(), &context),
                    last_modified: self.render_optional(node.last_modified.as_deref(), &context),
                    alternates,
                });
            }
        }

        Ok(out)
    }

    /// Assemble the record query: criteria rendered against the parent
    /// context, plus the implicit master filter for hierarchical types.
    fn build_query(&self, node: &ResolvedNode, parent: Option<&Json>) -> Query {
        let mut query = Query::new(&node.record_type);

        for raw in &node.filters {
            let criteria = match parent {
                Some(context) => self.render_leaves(raw, context),
                None => raw.clone(),
            };
            match Filter::from_criteria(&criteria) {
                Some(filter) => query.filters.push(filter),
                None => tracing::warn!(
                    record_type = %node.record_type,
                    "ignoring filter criteria without a property"
                ),
            }
        }

        for raw in &node.orders {
            let criteria = match parent {
                Some(context) => self.render_leaves(raw, context),
                None => raw.clone(),
            };
            match Order::from_criteria(&criteria) {
                Some(order) => query.orders.push(order),
                None => tracing::warn!(
                    record_type = %node.record_type,
                    "ignoring order criteria without a property"
                ),
            }
        }

        if self.source.hierarchical(&node.record_type) {
            query.master = Some(match parent {
                Some(context) => MasterFilter::Equals(json_to_string(
                    context.get("id").unwrap_or(&Json::Null),
                )),
                None => MasterFilter::IsNull,
            });
        }

        query
    }

    /// Render a criteria tree's leaf strings against a context.
    fn render_leaves(&self, value: &toml::Value, context: &Json) -> toml::Value {
        match value {
            toml::Value::String(template) => {
                toml::Value::String(self.renderer.render(template, context))
            }
            toml::Value::Array(items) => toml::Value::Array(
                items
                    .iter()
                    .map(|item| self.render_leaves(item, context))
                    .collect(),
            ),
            toml::Value::Table(table) => toml::Value::Table(
                table
                    .iter()
                    .map(|(key, entry)| (key.clone(), self.render_leaves(entry, context)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Render the node's URL template: trimmed, and rewritten onto the base
    /// origin when the node asks for absolute URLs.
    fn render_url(&self, node: &ResolvedNode, context: &Json) -> String {
        let url = self.renderer.render(&node.url, context).trim().to_owned();
        if node.relative_urls {
            url
        } else {
            origin::absolutize(&self.base_url, &url)
        }
    }

    /// Render the node's `data` mapping into an opaque JSON payload.
    fn render_data(&self, node: &ResolvedNode, context: &Json) -> Json {
        if node.data.is_empty() {
            return Json::Null;
        }
        let rendered = self.render_leaves(&toml::Value::Table(node.data.clone()), context);
        toml_to_json(&rendered)
    }

    /// Render an optional template, empty when unconfigured or blank.
    fn render_optional(&self, template: Option<&str>, context: &Json) -> String {
        template
            .filter(|t| is_truthy(t))
            .map(|t| self.renderer.render(t, context))
            .unwrap_or_default()
    }
}

/// Inheritable node flags, resolved top-down once per build.
#[derive(Clone, Debug)]
struct Cascade {
    l10n: bool,
    locale: String,
    check_active_routes: bool,
    relative_urls: bool,
}

impl Cascade {
    /// Sitemap-level overrides atop the built-in defaults.
    fn from_root(root: &RootNode, default_locale: &str) -> Self {
        Self {
            l10n: root.l10n.unwrap_or(true),
            locale: root
                .locale
                .clone()
                .unwrap_or_else(|| default_locale.to_owned()),
            check_active_routes: root.check_active_routes.unwrap_or(true),
            relative_urls: root.relative_urls.unwrap_or(true),
        }
    }

    /// A node's own overrides atop the inherited values.
    fn overridden_by(&self, node: &ObjectNode) -> Self {
        Self {
            l10n: node.l10n.unwrap_or(self.l10n),
            locale: node.locale.clone().unwrap_or_else(|| self.locale.clone()),
            check_active_routes: node.check_active_routes.unwrap_or(self.check_active_routes),
            relative_urls: node.relative_urls.unwrap_or(self.relative_urls),
        }
    }
}

/// An [`ObjectNode`] with every inheritable value resolved to a concrete
/// one. Built once per top-level entry; the recursion never re-merges
/// options.
#[derive(Clone, Debug)]
struct ResolvedNode {
    record_type: String,
    label: String,
    url: String,
    condition: Option<String>,
    filters: Vec<toml::Value>,
    orders: Vec<toml::Value>,
    data: toml::Table,
    priority: Option<String>,
    last_modified: Option<String>,
    transformer: Option<String>,
    l10n: bool,
    locale: String,
    check_active_routes: bool,
    relative_urls: bool,
    children: Vec<ResolvedNode>,
}

impl ResolvedNode {
    fn resolve(node: &ObjectNode, inherited: &Cascade) -> Self {
        let cascade = inherited.overridden_by(node);
        Self {
            record_type: node.record_type.clone(),
            label: node.label.clone().unwrap_or_else(|| "{{title}}".to_owned()),
            url: node.url.clone().unwrap_or_else(|| "{{url}}".to_owned()),
            condition: node.condition.clone(),
            filters: node.filters.clone(),
            orders: node.orders.clone(),
            data: node.data.clone(),
            priority: node.priority.clone(),
            last_modified: node.last_modified.clone(),
            transformer: node.transformer.clone(),
            children: node
                .children
                .iter()
                .map(|child| Self::resolve(child, &cascade))
                .collect(),
            l10n: cascade.l10n,
            locale: cascade.locale,
            check_active_routes: cascade.check_active_routes,
            relative_urls: cascade.relative_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use waypost_cache::{Cache, MemoryCache};

    use super::*;
    use crate::error::RecordError;
    use crate::presenter::TransformerRegistry;
    use crate::record::Record;
    use crate::render::PlaceholderRenderer;

    /// Test record: localized fields plus per-locale route activity.
    #[derive(Debug)]
    struct StubRecord {
        record_type: String,
        id: String,
        fields: HashMap<String, HashMap<String, Json>>,
        routes: Option<HashMap<String, bool>>,
    }

    impl StubRecord {
        fn page(id: &str, fields: &[(&str, &[(&str, Json)])]) -> Self {
            let fields = fields
                .iter()
                .map(|(name, by_locale)| {
                    (
                        (*name).to_owned(),
                        by_locale
                            .iter()
                            .map(|(locale, value)| ((*locale).to_owned(), value.clone()))
                            .collect(),
                    )
                })
                .collect();
            Self {
                record_type: "page".to_owned(),
                id: id.to_owned(),
                fields,
                routes: None,
            }
        }

        fn with_routes(mut self, routes: &[(&str, bool)]) -> Self {
            self.routes = Some(
                routes
                    .iter()
                    .map(|(locale, active)| ((*locale).to_owned(), *active))
                    .collect(),
            );
            self
        }
    }

    impl Record for StubRecord {
        fn record_type(&self) -> &str {
            &self.record_type
        }

        fn id(&self) -> String {
            self.id.clone()
        }

        fn get(&self, name: &str, locale: &str) -> Option<Json> {
            if name == "id" {
                return Some(json!(self.id));
            }
            let by_locale = self.fields.get(name)?;
            by_locale
                .get(locale)
                .or_else(|| by_locale.get("*"))
                .cloned()
        }

        fn route_active(&self, locale: &str) -> Option<bool> {
            self.routes
                .as_ref()
                .map(|routes| routes.get(locale).copied().unwrap_or(false))
        }
    }

    /// Record source handing out canned records, counting loads.
    #[derive(Default)]
    struct StubSource {
        by_type: HashMap<String, Vec<Arc<dyn Record>>>,
        hierarchical: Vec<String>,
        loads: AtomicUsize,
        queries: Mutex<Vec<Query>>,
    }

    impl StubSource {
        fn with(mut self, record_type: &str, records: Vec<Arc<dyn Record>>) -> Self {
            self.by_type.insert(record_type.to_owned(), records);
            self
        }

        fn load_count(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    impl RecordSource for StubSource {
        fn hierarchical(&self, record_type: &str) -> bool {
            self.hierarchical.iter().any(|t| t == record_type)
        }

        fn load(&self, query: &Query) -> Result<Vec<Arc<dyn Record>>, RecordError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.clone());
            self.by_type
                .get(&query.record_type)
                .cloned()
                .ok_or_else(|| RecordError::UnknownType(query.record_type.clone()))
        }
    }

    fn home_page() -> Arc<dyn Record> {
        Arc::new(StubRecord::page(
            "home",
            &[
                ("title", &[("en", json!("Home")), ("fr", json!("Accueil"))]),
                ("url", &[("en", json!("/home")), ("fr", json!("/accueil"))]),
            ],
        ))
    }

    fn builder_with(source: StubSource, config_toml: &str) -> SitemapBuilder {
        let config: SitemapConfig = toml::from_str(config_toml).unwrap();
        SitemapBuilder::new(
            "https://example.com",
            Arc::new(source),
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::new("en", vec!["en".to_owned(), "fr".to_owned()]),
        )
        .unwrap()
        .with_config(config)
    }

    const PAGE_SITEMAP: &str = r#"
        [[default.objects]]
        type = "page"
        label = "{{title}}"
        url = "{{url}}"
    "#;

    #[test]
    fn test_end_to_end_two_locales() {
        let source = StubSource::default().with("page", vec![home_page()]);
        let builder = builder_with(source, PAGE_SITEMAP);

        let forest = builder.build("default").unwrap();

        assert_eq!(forest.len(), 1);
        let links = &forest[0];
        assert_eq!(links.len(), 2);

        let en = &links[0];
        assert_eq!(en.label, "Home");
        assert_eq!(en.url, "/home");
        assert_eq!(en.lang, "en");
        assert_eq!(en.level, 1);
        assert_eq!(
            en.alternates,
            vec![Alternate {
                url: "/accueil".to_owned(),
                lang: "fr".to_owned(),
            }]
        );

        let fr = &links[1];
        assert_eq!(fr.label, "Accueil");
        assert_eq!(fr.url, "/accueil");
        assert_eq!(fr.lang, "fr");
        assert_eq!(
            fr.alternates,
            vec![Alternate {
                url: "/home".to_owned(),
                lang: "en".to_owned(),
            }]
        );
    }

    #[test]
    fn test_no_link_carries_its_own_locale_as_alternate() {
        let source = StubSource::default().with("page", vec![home_page()]);
        let builder = builder_with(source, PAGE_SITEMAP);

        let forest = builder.build("default").unwrap();

        for link in forest.iter().flatten() {
            assert!(link.alternates.iter().all(|alt| alt.lang != link.lang));
        }
    }

    #[test]
    fn test_unknown_sitemap_id_fails() {
        let source = StubSource::default();
        let builder = builder_with(source, PAGE_SITEMAP);

        let err = builder.build("nonexistent").unwrap_err();

        assert!(matches!(err, BuildError::UnknownSitemap(id) if id == "nonexistent"));
    }

    #[test]
    fn test_sitemap_without_objects_fails() {
        let source = StubSource::default();
        let builder = builder_with(source, "[default]\nl10n = true");

        let err = builder.build("default").unwrap_err();

        assert!(matches!(err, BuildError::NoObjects(_)));
    }

    #[test]
    fn test_builder_without_config_builds_nothing() {
        let builder = SitemapBuilder::new(
            "https://example.com",
            Arc::new(StubSource::default()),
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::single("en"),
        )
        .unwrap();

        assert_eq!(builder.build("default").unwrap(), Vec::<Vec<Link>>::new());
    }

    #[test]
    fn test_blank_base_url_is_rejected() {
        let result = SitemapBuilder::new(
            "  ",
            Arc::new(StubSource::default()) as Arc<dyn RecordSource>,
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::single("en"),
        );

        assert!(matches!(result, Err(BuildError::MissingBaseUrl)));
    }

    #[test]
    fn test_l10n_off_builds_single_locale() {
        let source = StubSource::default().with("page", vec![home_page()]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "page"
            "#,
        );

        let forest = builder.build("default").unwrap();

        let links = &forest[0];
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].lang, "en");
        assert!(links[0].alternates.is_empty());
    }

    #[test]
    fn test_child_flag_overrides_inherited_cascade() {
        let child_page: Arc<dyn Record> = Arc::new(StubRecord::page(
            "child",
            &[
                ("title", &[("*", json!("Child"))]),
                ("url", &[("*", json!("/child"))]),
            ],
        ));
        let source = StubSource::default()
            .with("page", vec![home_page()])
            .with("block", vec![child_page]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "page"

            [[default.objects.children]]
            type = "block"
            l10n = true
            "#,
        );

        let forest = builder.build("default").unwrap();

        let parent = &forest[0][0];
        // Parent built once (l10n off), child forest localized (override on).
        assert_eq!(parent.lang, "en");
        let child_forest = &parent.children[0];
        let langs: Vec<_> = child_forest.iter().map(|l| l.lang.as_str()).collect();
        assert_eq!(langs, ["en", "fr"]);
    }

    #[test]
    fn test_false_condition_prunes_without_fetching() {
        let source = StubSource::default().with("page", vec![home_page()]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "page"

            [[default.objects.children]]
            type = "article"
            condition = "{{has_articles}}"
            "#,
        );

        let forest = builder.build("default").unwrap();

        // The pruned child still occupies its forest slot, empty.
        let parent = &forest[0][0];
        assert_eq!(parent.children, vec![Vec::<Link>::new()]);
    }

    #[test]
    fn test_condition_prune_skips_record_source() {
        let config: SitemapConfig = toml::from_str(
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "page"

            [[default.objects.children]]
            type = "article"
            condition = "{{has_articles}}"
            "#,
        )
        .unwrap();
        let source = Arc::new(StubSource::default().with("page", vec![home_page()]));
        let builder = SitemapBuilder::new(
            "https://example.com",
            Arc::clone(&source) as Arc<dyn RecordSource>,
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::single("en"),
        )
        .unwrap()
        .with_config(config);

        builder.build("default").unwrap();

        // One load for "page"; none for the pruned "article" child.
        assert_eq!(source.load_count(), 1);
    }

    #[test]
    fn test_level_increments_per_depth() {
        let section: Arc<dyn Record> = Arc::new(StubRecord::page(
            "s1",
            &[
                ("title", &[("*", json!("Section"))]),
                ("url", &[("*", json!("/section"))]),
                ("has_pages", &[("*", json!(true))]),
            ],
        ));
        let page: Arc<dyn Record> = Arc::new(StubRecord::page(
            "p1",
            &[
                ("title", &[("*", json!("Page"))]),
                ("url", &[("*", json!("/section/page"))]),
            ],
        ));
        let source = StubSource::default()
            .with("section", vec![section])
            .with("page", vec![page]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "section"

            [[default.objects.children]]
            type = "page"
            condition = "{{has_pages}}"
            "#,
        );

        let forest = builder.build("default").unwrap();

        let section_link = &forest[0][0];
        assert_eq!(section_link.level, 1);
        assert_eq!(section_link.children[0][0].level, 2);
    }

    #[test]
    fn test_inactive_locale_absent_as_primary_and_alternate() {
        let record = Arc::new(
            StubRecord::page(
                "draft",
                &[
                    ("title", &[("en", json!("Draft")), ("fr", json!("Brouillon"))]),
                    ("url", &[("en", json!("/draft")), ("fr", json!("/brouillon"))]),
                ],
            )
            .with_routes(&[("en", true), ("fr", false)]),
        ) as Arc<dyn Record>;
        let source = StubSource::default().with("page", vec![record]);
        let builder = builder_with(source, PAGE_SITEMAP);

        let forest = builder.build("default").unwrap();

        // No French primary link; the English link keeps no French alternate
        // either, since the record is inactive under fr.
        let links = &forest[0];
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].lang, "en");
        assert!(links[0].alternates.is_empty());
    }

    #[test]
    fn test_inactive_alternate_dropped_while_active_one_kept() {
        let record = Arc::new(
            StubRecord::page(
                "tri",
                &[
                    ("title", &[("*", json!("Tri"))]),
                    (
                        "url",
                        &[
                            ("en", json!("/tri-en")),
                            ("fr", json!("/tri-fr")),
                            ("de", json!("/tri-de")),
                        ],
                    ),
                ],
            )
            .with_routes(&[("en", true), ("fr", false), ("de", true)]),
        ) as Arc<dyn Record>;
        let source = StubSource::default().with("page", vec![record]);
        let config: SitemapConfig = toml::from_str(PAGE_SITEMAP).unwrap();
        let builder = SitemapBuilder::new(
            "https://example.com",
            Arc::new(source),
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::new(
                "en",
                vec!["en".to_owned(), "fr".to_owned(), "de".to_owned()],
            ),
        )
        .unwrap()
        .with_config(config);

        let forest = builder.build("default").unwrap();

        let links = &forest[0];
        let langs: Vec<_> = links.iter().map(|l| l.lang.as_str()).collect();
        assert_eq!(langs, ["en", "de"]);

        let en = &links[0];
        assert_eq!(
            en.alternates,
            vec![Alternate {
                url: "/tri-de".to_owned(),
                lang: "de".to_owned(),
            }]
        );
    }

    #[test]
    fn test_routes_disabled_check_keeps_inactive_records() {
        let record = Arc::new(
            StubRecord::page(
                "draft",
                &[
                    ("title", &[("*", json!("Draft"))]),
                    ("url", &[("*", json!("/draft"))]),
                ],
            )
            .with_routes(&[("en", false), ("fr", false)]),
        ) as Arc<dyn Record>;
        let source = StubSource::default().with("page", vec![record]);
        let builder = builder_with(
            source,
            r#"
            [default]
            check_active_routes = false

            [[default.objects]]
            type = "page"
            "#,
        );

        let forest = builder.build("default").unwrap();

        assert_eq!(forest[0].len(), 2);
    }

    #[test]
    fn test_relative_urls_off_rewrites_onto_base_origin() {
        let record = Arc::new(StubRecord::page(
            "q",
            &[
                ("title", &[("*", json!("Q"))]),
                ("url", &[("*", json!("/foo?q=1#bar"))]),
            ],
        )) as Arc<dyn Record>;
        let source = StubSource::default().with("page", vec![record]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false
            relative_urls = false

            [[default.objects]]
            type = "page"
            "#,
        );

        let forest = builder.build("default").unwrap();

        assert_eq!(forest[0][0].url, "https://example.com/foo?q=1#bar");
    }

    #[test]
    fn test_filters_rendered_against_parent_context() {
        let section: Arc<dyn Record> = Arc::new(StubRecord::page(
            "s9",
            &[
                ("title", &[("*", json!("Section"))]),
                ("url", &[("*", json!("/s9"))]),
            ],
        ));
        let page: Arc<dyn Record> = Arc::new(StubRecord::page(
            "p1",
            &[
                ("title", &[("*", json!("Page"))]),
                ("url", &[("*", json!("/s9/p1"))]),
            ],
        ));
        let config: SitemapConfig = toml::from_str(
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "section"

            [[default.objects.children]]
            type = "page"

            [[default.objects.children.filters]]
            property = "section_id"
            value = "{{id}}"
            "#,
        )
        .unwrap();
        let source = Arc::new(
            StubSource::default()
                .with("section", vec![section])
                .with("page", vec![page]),
        );
        let builder = SitemapBuilder::new(
            "https://example.com",
            Arc::clone(&source) as Arc<dyn RecordSource>,
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::single("en"),
        )
        .unwrap()
        .with_config(config);

        builder.build("default").unwrap();

        let queries = source.queries.lock().unwrap();
        let page_query = queries
            .iter()
            .find(|q| q.record_type == "page")
            .expect("page query");
        assert_eq!(page_query.filters[0].property, "section_id");
        assert_eq!(page_query.filters[0].value, json!("s9"));
    }

    #[test]
    fn test_hierarchical_type_gets_master_filter() {
        let section: Arc<dyn Record> = Arc::new(StubRecord::page(
            "s1",
            &[
                ("title", &[("*", json!("Top"))]),
                ("url", &[("*", json!("/top"))]),
            ],
        ));
        let config: SitemapConfig = toml::from_str(
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "section"

            [[default.objects.children]]
            type = "block"
            "#,
        )
        .unwrap();
        let mut stub = StubSource::default()
            .with("section", vec![Arc::clone(&section) as Arc<dyn Record>])
            .with("block", Vec::new());
        stub.hierarchical.push("section".to_owned());
        stub.hierarchical.push("block".to_owned());
        let source = Arc::new(stub);
        let builder = SitemapBuilder::new(
            "https://example.com",
            Arc::clone(&source) as Arc<dyn RecordSource>,
            Presenter::new(
                TransformerRegistry::new(),
                MemoryCache::new().bucket("contexts"),
            ),
            Arc::new(PlaceholderRenderer),
            Locales::single("en"),
        )
        .unwrap()
        .with_config(config);

        builder.build("default").unwrap();

        let queries = source.queries.lock().unwrap();
        assert_eq!(queries[0].master, Some(MasterFilter::IsNull));
        assert_eq!(
            queries[1].master,
            Some(MasterFilter::Equals("s1".to_owned()))
        );
    }

    #[test]
    fn test_data_mapping_rendered_per_record() {
        let source = StubSource::default().with("page", vec![home_page()]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "page"

            [default.objects.data]
            ident = "{{id}}"
            fixed = 7

            [default.objects.data.meta]
            heading = "{{title}}"
            "#,
        );

        let forest = builder.build("default").unwrap();

        let data = &forest[0][0].data;
        assert_eq!(data["ident"], "home");
        assert_eq!(data["fixed"], 7);
        assert_eq!(data["meta"]["heading"], "Home");
    }

    #[test]
    fn test_priority_and_last_modified_only_when_configured() {
        let record = Arc::new(StubRecord::page(
            "p",
            &[
                ("title", &[("*", json!("P"))]),
                ("url", &[("*", json!("/p"))]),
                ("updated", &[("*", json!("2024-05-01"))]),
            ],
        )) as Arc<dyn Record>;
        let source = StubSource::default().with("page", vec![record]);
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "page"
            priority = "0.8"
            last_modified = "{{updated}}"
            "#,
        );

        let forest = builder.build("default").unwrap();

        assert_eq!(forest[0][0].priority, "0.8");
        assert_eq!(forest[0][0].last_modified, "2024-05-01");
    }

    #[test]
    fn test_record_source_error_aborts_build() {
        let source = StubSource::default();
        let builder = builder_with(source, PAGE_SITEMAP);

        let err = builder.build("default").unwrap_err();

        assert!(matches!(
            err,
            BuildError::Record(RecordError::UnknownType(t)) if t == "page"
        ));
    }

    #[test]
    fn test_forest_slot_kept_for_empty_top_level_collection() {
        let source = StubSource::default()
            .with("page", vec![home_page()])
            .with("article", Vec::new());
        let builder = builder_with(
            source,
            r#"
            [default]
            l10n = false

            [[default.objects]]
            type = "article"

            [[default.objects]]
            type = "page"
            "#,
        );

        let forest = builder.build("default").unwrap();

        assert_eq!(forest.len(), 2);
        assert!(forest[0].is_empty());
        assert_eq!(forest[1].len(), 1);
    }
}
