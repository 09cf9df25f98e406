//! Value conversions shared by the renderer, presenter and builder.

use serde_json::Value as Json;

/// String form of a JSON value for placeholder substitution.
///
/// Follows loose-cast semantics: null and `false` become empty, `true`
/// becomes `"1"`, numbers print plainly. Composite values have no string
/// form and render empty rather than failing.
pub(crate) fn json_to_string(value: &Json) -> String {
    match value {
        Json::Null | Json::Bool(false) => String::new(),
        Json::Bool(true) => "1".to_owned(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.clone(),
        Json::Array(_) | Json::Object(_) => String::new(),
    }
}

/// Truthiness of a rendered template, used for condition gates.
///
/// Empty strings, `"0"` and `"false"` (any case) are falsy; everything else
/// is truthy. Booleans render through [`json_to_string`] as `"1"`/`""`, so a
/// `{{flag}}` condition behaves as expected.
#[must_use]
pub fn is_truthy(rendered: &str) -> bool {
    let rendered = rendered.trim();
    !rendered.is_empty() && rendered != "0" && !rendered.eq_ignore_ascii_case("false")
}

/// Convert a TOML value into its JSON equivalent.
///
/// TOML datetimes have no JSON counterpart and carry over as their string
/// representation.
pub(crate) fn toml_to_json(value: &toml::Value) -> Json {
    match value {
        toml::Value::String(s) => Json::String(s.clone()),
        toml::Value::Integer(i) => Json::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
        toml::Value::Boolean(b) => Json::Bool(*b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(items) => Json::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Json::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}
