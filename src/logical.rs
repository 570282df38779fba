//! Logical type mapping.

use serde_json::Value;

use crate::bridge::SchemaBridge;
use crate::error::BridgeError;
use crate::node::{declared_type, NodeShape};
use crate::types::LogicalType;

impl SchemaBridge {
    /// Logical type of the field at `path`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::UnrepresentableType` for `type: "null"` (and
    /// unknown type names), plus any error from resolving the path.
    pub fn get_type(&self, path: &str) -> Result<LogicalType, BridgeError> {
        let node = self.field_node(path)?;
        logical_type_of(&node, path)
    }
}

pub(crate) fn logical_type_of(node: &Value, path: &str) -> Result<LogicalType, BridgeError> {
    let format = node.get("format").and_then(Value::as_str);
    match declared_type(node) {
        Some(json_type) => LogicalType::from_json_type(json_type, format).ok_or_else(|| {
            BridgeError::UnrepresentableType {
                path: path.to_string(),
                json_type: json_type.to_string(),
            }
        }),
        None => Ok(inferred_type(node, format)),
    }
}

/// Type of an untyped node, from its shape or its first enumerated value.
fn inferred_type(node: &Value, format: Option<&str>) -> LogicalType {
    match NodeShape::of(node) {
        NodeShape::Object { .. } => return LogicalType::Structure,
        NodeShape::Array(_) => return LogicalType::List,
        NodeShape::Scalar => {}
    }

    let sample = node
        .get("enum")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .or_else(|| node.get("const"));
    match sample {
        Some(Value::Number(_)) => LogicalType::Number,
        Some(Value::Bool(_)) => LogicalType::Boolean,
        Some(Value::Array(_)) => LogicalType::List,
        Some(Value::Object(_)) => LogicalType::Structure,
        _ if format == Some("date-time") => LogicalType::DateTime,
        _ => LogicalType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_of(node: Value) -> Result<LogicalType, BridgeError> {
        logical_type_of(&node, "field")
    }

    #[test]
    fn declared_types() {
        assert_eq!(type_of(json!({ "type": "integer", "default": 24 })).unwrap(), LogicalType::Number);
        assert_eq!(type_of(json!({ "type": "number" })).unwrap(), LogicalType::Number);
        assert_eq!(type_of(json!({ "type": "boolean" })).unwrap(), LogicalType::Boolean);
        assert_eq!(
            type_of(json!({ "type": "string", "format": "date-time" })).unwrap(),
            LogicalType::DateTime
        );
        assert_eq!(type_of(json!({ "type": ["string", "null"] })).unwrap(), LogicalType::Text);
    }

    #[test]
    fn null_type_is_unrepresentable() {
        let err = type_of(json!({ "type": "null" })).unwrap_err();
        assert!(err.to_string().contains("can not be represented as a type null"));

        let err = type_of(json!({ "type": ["null"] })).unwrap_err();
        assert!(matches!(err, BridgeError::UnrepresentableType { json_type, .. } if json_type == "null"));
    }

    #[test]
    fn unknown_type_name_is_unrepresentable() {
        assert!(matches!(
            type_of(json!({ "type": "decimal" })),
            Err(BridgeError::UnrepresentableType { .. })
        ));
    }

    #[test]
    fn untyped_nodes_are_inferred() {
        assert_eq!(type_of(json!({ "enum": ["a", "b"] })).unwrap(), LogicalType::Text);
        assert_eq!(type_of(json!({ "enum": [1, 2] })).unwrap(), LogicalType::Number);
        assert_eq!(type_of(json!({ "const": true })).unwrap(), LogicalType::Boolean);
        assert_eq!(
            type_of(json!({ "properties": { "a": {} } })).unwrap(),
            LogicalType::Structure
        );
        assert_eq!(type_of(json!({ "items": {} })).unwrap(), LogicalType::List);
        assert_eq!(type_of(json!({})).unwrap(), LogicalType::Text);
    }
}
