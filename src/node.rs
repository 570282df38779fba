//! Shape classification of resolved schema nodes.

use serde_json::{Map, Value};

/// Item declaration of an array schema.
#[derive(Debug, Clone, Copy)]
pub enum Items<'a> {
    /// Fixed tuple: one schema per position.
    Tuple(&'a [Value]),
    /// Homogeneous: one schema for every element.
    Homogeneous(&'a Value),
    /// No `items` keyword.
    Unspecified,
}

/// Closed set of node shapes the queries dispatch on.
#[derive(Debug, Clone, Copy)]
pub enum NodeShape<'a> {
    Object {
        properties: Option<&'a Map<String, Value>>,
        required: Option<&'a Vec<Value>>,
    },
    Array(Items<'a>),
    Scalar,
}

impl<'a> NodeShape<'a> {
    /// Classify a resolved node.
    ///
    /// A node is an object when it declares `type: "object"` or has
    /// `properties`, and an array when it declares `type: "array"` or has
    /// `items`. Anything else is a scalar.
    pub fn of(node: &'a Value) -> Self {
        let declared = declared_type(node);
        let properties = node.get("properties").and_then(Value::as_object);

        if declared == Some("object") || (declared.is_none() && properties.is_some()) {
            return NodeShape::Object {
                properties,
                required: node.get("required").and_then(Value::as_array),
            };
        }

        if declared == Some("array") || (declared.is_none() && node.get("items").is_some()) {
            let items = match node.get("items") {
                Some(Value::Array(tuple)) => Items::Tuple(tuple.as_slice()),
                Some(single) => Items::Homogeneous(single),
                None => Items::Unspecified,
            };
            return NodeShape::Array(items);
        }

        NodeShape::Scalar
    }

    /// True when `key` is listed in this object's `required` set.
    pub fn requires(&self, key: &str) -> bool {
        match self {
            NodeShape::Object {
                required: Some(required),
                ..
            } => required.iter().any(|r| r.as_str() == Some(key)),
            _ => false,
        }
    }
}

/// Declared JSON type of a node.
///
/// A type list maps to its first non-`null` member; a list holding only
/// `null` yields `"null"`.
pub fn declared_type(node: &Value) -> Option<&str> {
    match node.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            names
                .iter()
                .copied()
                .find(|t| *t != "null")
                .or_else(|| names.first().copied())
        }
        _ => None,
    }
}
