//! Core engine for Waypost: localized sitemap link trees.
//!
//! Expands a declarative content-hierarchy configuration into a forest of
//! localized links and provides the seams the builder pulls on:
//!
//! - [`SitemapBuilder`]: recursive hierarchy expansion with locale
//!   cross-products, option cascading, and condition-gated pruning
//! - [`Presenter`]: memoized record → presentation-context conversion
//! - [`Record`] / [`RecordSource`]: the opaque domain-record seam
//! - [`TemplateRenderer`]: the template-engine seam, with a `{{name}}`
//!   placeholder default
//!
//! XML emission lives in `waypost-xml`; stores and HTTP wiring live in
//! their own crates.

pub mod builder;
pub mod config;
pub mod error;
pub mod link;
pub mod locale;
pub mod origin;
pub mod presenter;
pub mod record;
pub mod render;
pub mod shape;
mod value;

pub use builder::SitemapBuilder;
pub use config::{ObjectNode, RootNode, SitemapConfig};
pub use error::{BuildError, PresentError, RecordError};
pub use link::{Alternate, Link};
pub use locale::Locales;
pub use presenter::{Presenter, Transformer, TransformerRegistry};
pub use record::{
    Direction, Filter, FilterOp, MasterFilter, Order, Query, Record, RecordSource,
};
pub use render::{PlaceholderRenderer, TemplateRenderer};
pub use shape::{SeqEntry, Shape, TransformFn};
pub use value::is_truthy;
