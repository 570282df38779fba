//! UI-facing field descriptors.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::bridge::SchemaBridge;
use crate::error::BridgeError;
use crate::logical::logical_type_of;
use crate::node::{declared_type, Items, NodeShape};
use crate::options::FieldOptions;
use crate::path::{join_path, last_segment, parent_path};
use crate::types::{LogicalType, RENDER_HINTS_KEY, WILDCARD};

/// Keys with dedicated handling; never copied into [`FieldProps::extra`].
const RESERVED_KEYS: &[&str] = &[
    "label",
    "placeholder",
    "options",
    "allowedValues",
    "required",
    "decimal",
    "transform",
];

/// Caller-supplied overrides for [`SchemaBridge::get_props`].
///
/// An ordered key -> value list; writing a key again replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsOverrides {
    entries: Map<String, Value>,
}

impl PropsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// `true` derives a title from the field name; a string is used
    /// verbatim; `false`/`null` hide the label.
    pub fn label(self, label: impl Into<Value>) -> Self {
        self.set("label", label)
    }

    pub fn placeholder(self, placeholder: impl Into<Value>) -> Self {
        self.set("placeholder", placeholder)
    }

    /// Replace the schema-declared options for this call.
    pub fn options(self, options: impl Into<Value>) -> Self {
        self.set("options", options)
    }

    pub fn allowed_values(self, values: impl Into<Value>) -> Self {
        self.set("allowedValues", values)
    }

    pub fn required(self, required: bool) -> Self {
        self.set("required", required)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Build overrides from a JSON object; any other value is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(entries) => Some(Self { entries }),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for PropsOverrides {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

/// Derived descriptor of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldProps {
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
    #[serde(skip_serializing_if = "is_false")]
    pub decimal: bool,
    /// Render hints and pass-through caller keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl FieldProps {
    /// Display form of an allowed value, when options are in effect.
    pub fn transform(&self, value: &Value) -> Option<Value> {
        self.options.as_ref()?.transform(value)
    }
}

impl SchemaBridge {
    /// Compute the UI descriptor of the field at `path`.
    pub fn get_props(
        &self,
        path: &str,
        overrides: &PropsOverrides,
    ) -> Result<FieldProps, BridgeError> {
        let field = self.field_node(path)?;
        let name = last_segment(path);
        let title = title_case(name);
        let logical = logical_type_of(&field, path).ok();

        let required = match (overrides.get("required"), parent_path(path)) {
            (Some(value), _) => truthy(value),
            (None, Some(parent)) => {
                let parent_node = self.field_node(parent)?;
                NodeShape::of(&parent_node).requires(name)
            }
            (None, None) => false,
        };

        let label = match overrides.get("label") {
            None | Some(Value::Bool(true)) => title.clone(),
            Some(Value::String(text)) => text.clone(),
            Some(other) if truthy(other) => title.clone(),
            Some(_) => String::new(),
        };

        let placeholder = match (logical, overrides.get("placeholder")) {
            (Some(LogicalType::Text), Some(Value::Bool(true))) => Some(Value::String(title)),
            (Some(LogicalType::Text), Some(other)) => Some(other.clone()),
            _ => None,
        };

        let options = overrides
            .get("options")
            .and_then(|declared| parse_options(declared, path, "caller"))
            .or_else(|| {
                field
                    .get("options")
                    .and_then(|declared| parse_options(declared, path, "schema"))
            });

        let allowed_values = match overrides.get("allowedValues") {
            Some(Value::Null) => None,
            Some(Value::Array(values)) => Some(values.clone()),
            Some(value) => Some(vec![value.clone()]),
            None => match &options {
                Some(options) => Some(options.allowed_values()),
                None => self.enumerated_values(&field, path)?,
            },
        };

        let decimal = match overrides.get("decimal") {
            Some(value) => truthy(value),
            None => {
                logical == Some(LogicalType::Number)
                    && (declared_type(&field) == Some("number")
                        || options.as_ref().map_or(false, FieldOptions::has_fractional_values))
            }
        };

        let mut extra = Map::new();
        if let Some(Value::Object(hints)) = field.get(RENDER_HINTS_KEY) {
            extend_unreserved(&mut extra, hints);
        }
        extend_unreserved(&mut extra, &overrides.entries);

        Ok(FieldProps {
            label,
            required,
            placeholder,
            allowed_values,
            options,
            decimal,
            extra,
        })
    }

    /// `enum` of the field, or of its items for a homogeneous array.
    fn enumerated_values(
        &self,
        field: &Value,
        path: &str,
    ) -> Result<Option<Vec<Value>>, BridgeError> {
        if let Some(values) = field.get("enum").and_then(Value::as_array) {
            return Ok(Some(values.clone()));
        }
        if let NodeShape::Array(Items::Homogeneous(_)) = NodeShape::of(field) {
            let item = self.field_node(&join_path(path, WILDCARD))?;
            return Ok(item.get("enum").and_then(Value::as_array).cloned());
        }
        Ok(None)
    }
}

/// Malformed options are skipped; the linter reports them as E002.
fn parse_options(declared: &Value, path: &str, source: &str) -> Option<FieldOptions> {
    match FieldOptions::parse(declared) {
        Ok(options) => Some(options),
        Err(e) => {
            tracing::debug!(path, source, error = %e, "ignoring malformed options");
            None
        }
    }
}

fn extend_unreserved(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        if !RESERVED_KEYS.contains(&key.as_str()) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Human title of a field name: `dateOfBirth` -> `Date of birth`.
///
/// Splits on camel-case humps and on `_`, `-` and whitespace. Acronyms
/// (`URL`) keep their case; every other word is lowercased and only the
/// first word is capitalized.
pub fn title_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let words: Vec<String> = words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            let acronym = word.chars().count() > 1 && word.chars().all(|c| !c.is_lowercase());
            let word = if acronym { word } else { word.to_lowercase() };
            if i == 0 {
                capitalize(&word)
            } else {
                word
            }
        })
        .collect();
    words.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
