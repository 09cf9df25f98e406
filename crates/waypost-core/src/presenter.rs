//! Presentation layer: record → renderable context.
//!
//! The presenter turns an opaque [`Record`] into a JSON context suitable for
//! template rendering, according to a transformer. Results are memoized per
//! (transformer, record type, record id, locale) through a cache bucket, so
//! repeated lookups — the alternate-link pass revisits every record under
//! every locale — hit the cache instead of re-running the transform.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;
use waypost_cache::{CacheBucket, CacheBucketExt};

use crate::record::Record;
use crate::render::PLACEHOLDER;
use crate::shape::{SeqEntry, Shape, TransformFn};
use crate::value::json_to_string;

/// A named transform.
#[derive(Clone, Debug)]
pub struct Transformer {
    name: String,
    shape: Shape,
}

impl Transformer {
    /// The registered name; part of the memoization key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of transforms, looked up by name.
///
/// By convention one transformer exists per record type, registered under
/// the type's name. Unregistered names fall back to the routable transform
/// (`id`, `title`, `url`), which covers any record exposing those
/// properties.
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<Transformer>>,
    fallback: Arc<Transformer>,
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformerRegistry {
    /// Create a registry holding only the routable fallback transform.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transformers: HashMap::new(),
            fallback: Arc::new(Transformer {
                name: "routable".to_owned(),
                shape: routable_shape(),
            }),
        }
    }

    /// Register a declarative shape under a name.
    pub fn register_shape(&mut self, name: impl Into<String>, shape: Shape) {
        let name = name.into();
        self.transformers.insert(
            name.clone(),
            Arc::new(Transformer { name, shape }),
        );
    }

    /// Register a code transform under a name.
    pub fn register_fn(&mut self, name: impl Into<String>, transform: TransformFn) {
        self.register_shape(name, Shape::Callable(transform));
    }

    /// Resolve a transformer by name, falling back to the routable one.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Arc<Transformer> {
        self.transformers
            .get(name)
            .map_or_else(|| Arc::clone(&self.fallback), Arc::clone)
    }
}

/// The built-in fallback transform.
fn routable_shape() -> Shape {
    Shape::Map(vec![
        ("id".to_owned(), Shape::Template("{{id}}".to_owned())),
        ("title".to_owned(), Shape::Template("{{title}}".to_owned())),
        ("url".to_owned(), Shape::Template("{{url}}".to_owned())),
    ])
}

/// Memoizing record → presentation-context converter.
pub struct Presenter {
    registry: TransformerRegistry,
    cache: Box<dyn CacheBucket>,
}

impl Presenter {
    /// Create a presenter over a transformer registry and a cache bucket.
    #[must_use]
    pub fn new(registry: TransformerRegistry, cache: Box<dyn CacheBucket>) -> Self {
        Self { registry, cache }
    }

    /// Convert a record into its presentation context under a locale.
    ///
    /// `transformer` selects a registered transform by name; `None` uses the
    /// record type's conventional transformer. A memoized context is
    /// returned without re-running the transform.
    pub fn transform(&self, record: &dyn Record, transformer: Option<&str>, locale: &str) -> Json {
        let transformer = self
            .registry
            .resolve(transformer.unwrap_or_else(|| record.record_type()));

        let key = format!(
            "{}:{}:{}:{}",
            transformer.name(),
            record.record_type(),
            record.id(),
            locale,
        );
        if let Some(context) = self.cache.get_json::<Json>(&key, "") {
            return context;
        }

        let context = transmogrify(record, &transformer.shape, locale);
        self.cache.set_json(&key, "", &context);
        context
    }
}

/// Interpret a shape against a record, producing a context value.
fn transmogrify(record: &dyn Record, shape: &Shape, locale: &str) -> Json {
    match shape {
        Shape::Callable(transform) => transform(record, locale),
        Shape::Map(entries) => {
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (key, entry) in entries {
                out.insert(key.clone(), transmogrify(record, entry, locale));
            }
            Json::Object(out)
        }
        Shape::Seq(entries) => {
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (index, entry) in entries.iter().enumerate() {
                match entry {
                    SeqEntry::Property(name) => {
                        out.insert(name.clone(), record_get(record, name, locale));
                    }
                    SeqEntry::Literal(value) => {
                        out.insert(index.to_string(), value.clone());
                    }
                }
            }
            Json::Object(out)
        }
        Shape::Template(template) => Json::String(
            PLACEHOLDER
                .replace_all(template, |caps: &regex::Captures<'_>| {
                    json_to_string(&record_get(record, &caps[1], locale))
                })
                .into_owned(),
        ),
        Shape::Literal(value) => value.clone(),
    }
}

/// Property access with a null fallback for absent properties.
fn record_get(record: &dyn Record, name: &str, locale: &str) -> Json {
    record.get(name, locale).unwrap_or(Json::Null)
}
