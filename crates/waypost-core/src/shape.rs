//! Transform shapes.
//!
//! A shape declares how a record becomes a presentation context. Shapes are
//! parsed from configuration ONCE, into a tagged variant tree; the presenter
//! walks the tree per record without re-inspecting value types.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::error::PresentError;
use crate::record::Record;
use crate::value::toml_to_json;

/// A code-registered transform: record + locale in, context value out.
pub type TransformFn = Arc<dyn Fn(&dyn Record, &str) -> Json + Send + Sync>;

/// Parsed transform declaration.
#[derive(Clone)]
pub enum Shape {
    /// Invoke a function with the record; its result is used verbatim.
    Callable(TransformFn),
    /// Build an object, interpreting each entry's shape under its key.
    Map(Vec<(String, Shape)>),
    /// Build an object from a positional list: string entries pull the named
    /// property, anything else passes through as a literal.
    Seq(Vec<SeqEntry>),
    /// Substitute `{{name}}` placeholders with record properties.
    Template(String),
    /// Pass the value through unchanged.
    Literal(Json),
}

/// One entry of a positional [`Shape::Seq`] list.
#[derive(Clone, Debug, PartialEq)]
pub enum SeqEntry {
    /// Pull the named record property under that name.
    Property(String),
    /// Keep the value as-is.
    Literal(Json),
}

impl Shape {
    /// Parse a shape from a TOML declaration.
    ///
    /// Strings are templates, tables nest, arrays are positional lists,
    /// scalars are literals. TOML datetimes have no shape interpretation and
    /// are rejected.
    pub fn from_toml(value: &toml::Value) -> Result<Self, PresentError> {
        match value {
            toml::Value::String(s) => Ok(Self::Template(s.clone())),
            toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                Ok(Self::Literal(toml_to_json(value)))
            }
            toml::Value::Array(items) => Ok(Self::Seq(
                items
                    .iter()
                    .map(|item| match item {
                        toml::Value::String(name) => SeqEntry::Property(name.clone()),
                        other => SeqEntry::Literal(toml_to_json(other)),
                    })
                    .collect(),
            )),
            toml::Value::Table(table) => table
                .iter()
                .map(|(key, entry)| Ok((key.clone(), Self::from_toml(entry)?)))
                .collect::<Result<_, _>>()
                .map(Self::Map),
            toml::Value::Datetime(dt) => {
                Err(PresentError::UnsupportedShape(dt.to_string()))
            }
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Seq(entries) => f.debug_tuple("Seq").field(entries).finish(),
            Self::Template(s) => f.debug_tuple("Template").field(s).finish(),
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
        }
    }
}
