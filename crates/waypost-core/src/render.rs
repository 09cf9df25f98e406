//! Template rendering seam.
//!
//! Labels, URLs, conditions and data payloads are templates rendered against
//! a presentation context. The engine behind them is replaceable through
//! [`TemplateRenderer`]; the default [`PlaceholderRenderer`] substitutes
//! `{{name}}` placeholders from the context object and nothing more.
//!
//! Rendering never fails: a placeholder with no matching context entry
//! renders as the empty string.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as Json;

use crate::value::json_to_string;

/// `{{name}}` placeholder pattern shared by the renderer and the presenter.
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("invalid placeholder regex"));

/// Renders a template string against a context object.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template`, resolving placeholders from `context`.
    ///
    /// Implementations must not fail; unresolvable placeholders render as
    /// empty or pass through unchanged at the implementation's discretion.
    fn render(&self, template: &str, context: &Json) -> String;
}

/// Default renderer: `{{name}}` lookup in the context object.
///
/// Values are stringified with loose-cast semantics (`null`/`false` empty,
/// `true` as `"1"`); anything that is not a context object member renders
/// empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderRenderer;

impl TemplateRenderer for PlaceholderRenderer {
    fn render(&self, template: &str, context: &Json) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &regex::Captures<'_>| {
                context.get(&caps[1]).map(json_to_string).unwrap_or_default()
            })
            .into_owned()
    }
}
