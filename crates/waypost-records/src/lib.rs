//! JSON-file-backed record source.
//!
//! [`JsonStore`] loads a content inventory from a single JSON document and
//! serves it through the [`RecordSource`] query interface. The format, by
//! record type:
//!
//! ```json
//! {
//!   "page": {
//!     "hierarchical": true,
//!     "records": [
//!       {
//!         "id": "home",
//!         "parent": null,
//!         "routes": { "en": true, "fr": true },
//!         "title": { "en": "Home", "fr": "Accueil" },
//!         "url": { "en": "/home", "fr": "/accueil" }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! `id`, `parent` and `routes` are reserved; every other key is a record
//! field. A field valued as an object holding the requested locale's key is
//! localized — lookups resolve the per-locale value; anything else is served
//! as-is. Records without a `routes` map are not routable and never excluded
//! by the active-route check.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as Json;
use waypost_core::{
    Direction, Filter, FilterOp, MasterFilter, Query, Record, RecordError, RecordSource,
};

/// Record store loaded from a JSON document.
#[derive(Debug)]
pub struct JsonStore {
    types: HashMap<String, StoreType>,
}

#[derive(Debug)]
struct StoreType {
    hierarchical: bool,
    records: Vec<Arc<JsonRecord>>,
}

/// One record type's entry in the store file.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    #[serde(default)]
    hierarchical: bool,
    #[serde(default)]
    records: Vec<RawRecord>,
}

/// One record as it appears in the store file.
#[derive(Deserialize)]
struct RawRecord {
    id: Json,
    #[serde(default)]
    parent: Option<Json>,
    #[serde(default)]
    routes: Option<HashMap<String, bool>>,
    #[serde(flatten)]
    fields: serde_json::Map<String, Json>,
}

impl JsonStore {
    /// Load a store from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parse a store from a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, RecordError> {
        let parsed: HashMap<String, RawType> = serde_json::from_str(raw)?;

        let types = parsed
            .into_iter()
            .map(|(record_type, entry)| {
                let records = entry
                    .records
                    .into_iter()
                    .map(|record| {
                        Arc::new(JsonRecord {
                            record_type: record_type.clone(),
                            id: scalar_string(&record.id),
                            parent: record.parent.as_ref().and_then(|p| {
                                if p.is_null() {
                                    None
                                } else {
                                    Some(scalar_string(p))
                                }
                            }),
                            routes: record.routes,
                            fields: record.fields,
                        })
                    })
                    .collect();
                (
                    record_type,
                    StoreType {
                        hierarchical: entry.hierarchical,
                        records,
                    },
                )
            })
            .collect();

        Ok(Self { types })
    }
}

impl RecordSource for JsonStore {
    fn hierarchical(&self, record_type: &str) -> bool {
        self.types
            .get(record_type)
            .is_some_and(|entry| entry.hierarchical)
    }

    fn load(&self, query: &Query) -> Result<Vec<Arc<dyn Record>>, RecordError> {
        let entry = self
            .types
            .get(&query.record_type)
            .ok_or_else(|| RecordError::UnknownType(query.record_type.clone()))?;

        let mut records: Vec<&Arc<JsonRecord>> = entry
            .records
            .iter()
            .filter(|record| record.matches(query))
            .collect();

        for order in query.orders.iter().rev() {
            records.sort_by(|a, b| {
                let ordering = cmp_json(&a.raw(&order.property), &b.raw(&order.property));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        tracing::debug!(
            record_type = %query.record_type,
            matched = records.len(),
            "loaded records"
        );

        Ok(records
            .into_iter()
            .map(|record| Arc::clone(record) as Arc<dyn Record>)
            .collect())
    }
}

/// A record served out of a [`JsonStore`].
#[derive(Debug)]
struct JsonRecord {
    record_type: String,
    id: String,
    parent: Option<String>,
    routes: Option<HashMap<String, bool>>,
    fields: serde_json::Map<String, Json>,
}

impl JsonRecord {
    /// Raw (unlocalized) field access, used for filtering and ordering.
    fn raw(&self, name: &str) -> Json {
        match name {
            "id" => Json::String(self.id.clone()),
            "parent" => self
                .parent
                .as_ref()
                .map_or(Json::Null, |p| Json::String(p.clone())),
            _ => self.fields.get(name).cloned().unwrap_or(Json::Null),
        }
    }

    fn matches(&self, query: &Query) -> bool {
        if let Some(master) = &query.master {
            let matched = match master {
                MasterFilter::Equals(id) => self.parent.as_deref() == Some(id.as_str()),
                MasterFilter::IsNull => self.parent.is_none(),
            };
            if !matched {
                return false;
            }
        }

        query.filters.iter().all(|filter| self.matches_filter(filter))
    }

    fn matches_filter(&self, filter: &Filter) -> bool {
        let value = self.raw(&filter.property);
        match filter.operator {
            FilterOp::Eq => loose_eq(&value, &filter.value),
            FilterOp::NotEq => !loose_eq(&value, &filter.value),
            FilterOp::IsNull => value.is_null(),
            FilterOp::NotNull => !value.is_null(),
        }
    }
}

impl Record for JsonRecord {
    fn record_type(&self) -> &str {
        &self.record_type
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn get(&self, name: &str, locale: &str) -> Option<Json> {
        match name {
            "id" => Some(Json::String(self.id.clone())),
            "parent" => Some(
                self.parent
                    .as_ref()
                    .map_or(Json::Null, |p| Json::String(p.clone())),
            ),
            _ => {
                let value = self.fields.get(name)?;
                Some(localize(value, locale))
            }
        }
    }

    fn route_active(&self, locale: &str) -> Option<bool> {
        self.routes
            .as_ref()
            .map(|routes| routes.get(locale).copied().unwrap_or(false))
    }
}

/// Resolve a possibly localized field value.
fn localize(value: &Json, locale: &str) -> Json {
    match value {
        Json::Object(map) => map.get(locale).cloned().unwrap_or_else(|| value.clone()),
        _ => value.clone(),
    }
}

/// String form of a scalar identifier.
fn scalar_string(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality with string/number leniency, so template-rendered filter values
/// (always strings) still match numeric fields.
fn loose_eq(a: &Json, b: &Json) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Json::String(s), Json::Number(n)) | (Json::Number(n), Json::String(s)) => {
            *s == n.to_string()
        }
        _ => false,
    }
}

/// Total order over JSON values for the order criteria: null < bool <
/// number < string; composites compare equal.
fn cmp_json(a: &Json, b: &Json) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    fn rank(value: &Json) -> u8 {
        match value {
            Json::Null => 0,
            Json::Bool(_) => 1,
            Json::Number(_) => 2,
            Json::String(_) => 3,
            Json::Array(_) | Json::Object(_) => 4,
        }
    }

    match (a, b) {
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        (Json::Number(x), Json::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Json::String(x), Json::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
