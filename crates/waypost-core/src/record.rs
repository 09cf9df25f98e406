//! Record and record-source seams.
//!
//! Domain records stay opaque to the builder: everything it needs goes
//! through [`Record`]'s accessor and [`RecordSource`]'s query interface.
//! Concrete stores live in their own crates (see `waypost-records` for the
//! JSON-file-backed one).

use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::error::RecordError;
use crate::value::toml_to_json;

/// A domain record exposed to the presenter and builder.
///
/// `get` is the single polymorphic access point: whatever the backing shape
/// (struct fields, a map, generated code), a record answers property lookups
/// by name under an explicit locale.
pub trait Record: std::fmt::Debug + Send + Sync {
    /// The record's type identifier (e.g. `"page"`).
    fn record_type(&self) -> &str;

    /// The record's identifier, stringified.
    fn id(&self) -> String;

    /// Look up a property under the given locale.
    fn get(&self, name: &str, locale: &str) -> Option<Json>;

    /// Route activity under the given locale.
    ///
    /// `None` means the record is not routable at all; such records are
    /// never skipped by the active-route check.
    fn route_active(&self, locale: &str) -> Option<bool>;
}

/// Provides record sequences per type and criteria.
pub trait RecordSource: Send + Sync {
    /// Whether the record type participates in a parent/child hierarchy.
    ///
    /// Hierarchical types get an implicit [`MasterFilter`] on every query.
    fn hierarchical(&self, record_type: &str) -> bool {
        let _ = record_type;
        false
    }

    /// Load the records matching a query, in source order.
    fn load(&self, query: &Query) -> Result<Vec<Arc<dyn Record>>, RecordError>;
}

/// A record query: type plus filter/order criteria.
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// Record type to collect.
    pub record_type: String,
    /// Filter criteria, all of which must match.
    pub filters: Vec<Filter>,
    /// Order criteria, applied in sequence.
    pub orders: Vec<Order>,
    /// Implicit parent filter for hierarchical types.
    pub master: Option<MasterFilter>,
}

impl Query {
    /// Create a query for a record type.
    #[must_use]
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            ..Self::default()
        }
    }
}

/// A single filter criterion.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    /// Property the filter applies to.
    pub property: String,
    /// Comparison value.
    pub value: Json,
    /// Comparison operator.
    pub operator: FilterOp,
}

impl Filter {
    /// Parse a filter out of a criteria table
    /// (`{ property = "...", value = ..., operator = "..." }`).
    ///
    /// Returns `None` when no property is named; an unrecognized operator
    /// falls back to equality.
    #[must_use]
    pub fn from_criteria(value: &toml::Value) -> Option<Self> {
        let table = value.as_table()?;
        let property = table.get("property")?.as_str()?.to_owned();
        let operator = table
            .get("operator")
            .and_then(toml::Value::as_str)
            .and_then(|op| op.parse().ok())
            .unwrap_or_default();
        let value = table.get("value").map_or(Json::Null, toml_to_json);

        Some(Self {
            property,
            value,
            operator,
        })
    }
}

/// Filter comparison operators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterOp {
    /// Property equals the value.
    #[default]
    Eq,
    /// Property differs from the value.
    NotEq,
    /// Property is absent or null.
    IsNull,
    /// Property is present and non-null.
    NotNull,
}

impl FromStr for FilterOp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Self::Eq),
            "!=" | "<>" => Ok(Self::NotEq),
            "IS NULL" => Ok(Self::IsNull),
            "IS NOT NULL" => Ok(Self::NotNull),
            _ => Err(()),
        }
    }
}

/// A single order criterion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Property to order by.
    pub property: String,
    /// Sort direction.
    pub direction: Direction,
}

impl Order {
    /// Parse an order out of a criteria table
    /// (`{ property = "...", direction = "desc" }`).
    #[must_use]
    pub fn from_criteria(value: &toml::Value) -> Option<Self> {
        let table = value.as_table()?;
        let property = table.get("property")?.as_str()?.to_owned();
        let direction = table
            .get("direction")
            .and_then(toml::Value::as_str)
            .and_then(|dir| dir.parse().ok())
            .unwrap_or_default();

        Some(Self {
            property,
            direction,
        })
    }
}

/// Sort direction for an [`Order`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(()),
        }
    }
}

/// Implicit parent filter applied to hierarchical record types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MasterFilter {
    /// Children of the given parent record.
    Equals(String),
    /// Top-level records (no parent).
    IsNull,
}
