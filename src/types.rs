//! Core types shared by the bridge queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path segment selecting the schema of any array element.
pub const WILDCARD: &str = "$";

/// Schema key holding rendering hints that are passed through untouched.
pub const RENDER_HINTS_KEY: &str = "uniforms";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// UI-relevant data category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    Text,
    Number,
    Boolean,
    DateTime,
    List,
    Structure,
}

impl LogicalType {
    /// Map a declared JSON Schema type and format to a logical type.
    ///
    /// Returns `None` for `null` and for unknown type names.
    pub fn from_json_type(json_type: &str, format: Option<&str>) -> Option<Self> {
        match json_type {
            "string" if format == Some("date-time") => Some(LogicalType::DateTime),
            "string" => Some(LogicalType::Text),
            "integer" | "number" => Some(LogicalType::Number),
            "boolean" => Some(LogicalType::Boolean),
            "array" => Some(LogicalType::List),
            "object" => Some(LogicalType::Structure),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogicalType::Text => "Text",
            LogicalType::Number => "Number",
            LogicalType::Boolean => "Boolean",
            LogicalType::DateTime => "DateTime",
            LogicalType::List => "List",
            LogicalType::Structure => "Structure",
        };
        f.write_str(name)
    }
}

/// Bridge configuration.
///
/// None of these are consumed by the queries themselves; they are forwarded
/// to the validator collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeOptions {
    /// Report every validation failure rather than only the first.
    pub all_errors: bool,
    /// Fill in schema defaults for missing properties before validating.
    pub use_defaults: bool,
    /// Drop properties not allowed by `additionalProperties: false`.
    pub remove_additional: bool,
}

impl BridgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_errors(mut self, all_errors: bool) -> Self {
        self.all_errors = all_errors;
        self
    }

    pub fn use_defaults(mut self, use_defaults: bool) -> Self {
        self.use_defaults = use_defaults;
        self
    }

    pub fn remove_additional(mut self, remove_additional: bool) -> Self {
        self.remove_additional = remove_additional;
        self
    }
}

/// Largest `initial_count` accepted by `get_initial_value`.
pub const MAX_INITIAL_COUNT: usize = 10_000;

/// Options for initial value computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialValueOptions {
    /// Number of placeholder elements materialized for array fields.
    pub initial_count: usize,
}

impl InitialValueOptions {
    pub fn with_count(initial_count: usize) -> Self {
        Self { initial_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_type_mapping() {
        assert_eq!(
            LogicalType::from_json_type("string", None),
            Some(LogicalType::Text)
        );
        assert_eq!(
            LogicalType::from_json_type("string", Some("date-time")),
            Some(LogicalType::DateTime)
        );
        assert_eq!(
            LogicalType::from_json_type("string", Some("email")),
            Some(LogicalType::Text)
        );
        assert_eq!(
            LogicalType::from_json_type("integer", None),
            Some(LogicalType::Number)
        );
        assert_eq!(
            LogicalType::from_json_type("array", None),
            Some(LogicalType::List)
        );
        assert_eq!(LogicalType::from_json_type("null", None), None);
    }

    #[test]
    fn bridge_options_from_config_object() {
        let opts: BridgeOptions = serde_json::from_value(serde_json::json!({
            "allErrors": true,
            "useDefaults": true,
            "removeAdditional": true
        }))
        .unwrap();
        assert_eq!(
            opts,
            BridgeOptions::new()
                .all_errors(true)
                .use_defaults(true)
                .remove_additional(true)
        );
    }

    #[test]
    fn bridge_options_missing_keys_default_off() {
        let opts: BridgeOptions = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(opts, BridgeOptions::default());
    }
}
