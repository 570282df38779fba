//! Field path navigation and sub-field listing.

use std::sync::Arc;

use serde_json::Value;

use crate::bridge::SchemaBridge;
use crate::error::BridgeError;
use crate::node::{Items, NodeShape};
use crate::types::WILDCARD;

/// Split a dotted field path. The empty path has no segments.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Append a segment to a field path.
pub fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Path of the enclosing field, or `None` for the root.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rsplit_once('.').map_or("", |(parent, _)| parent))
}

/// Final segment of a field path (empty for the root).
pub fn last_segment(path: &str) -> &str {
    path.rsplit_once('.').map_or(path, |(_, last)| last)
}

/// Validator-facing form of a field path: `firstName` -> `.firstName`.
pub fn error_path(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(".{}", path)
    }
}

/// Convert a JSON Pointer instance location (`/a/0/b`) to error-path form
/// (`.a.0.b`).
pub fn error_path_from_pointer(pointer: &str) -> String {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| format!(".{}", segment.replace("~1", "/").replace("~0", "~")))
        .collect()
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Unresolved schema of `segment` under a resolved node.
fn child_schema<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match NodeShape::of(node) {
        NodeShape::Object { properties, .. } => properties?.get(segment),
        NodeShape::Array(Items::Tuple(items)) if is_index(segment) => {
            segment.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        NodeShape::Array(Items::Homogeneous(item)) if segment == WILDCARD || is_index(segment) => {
            Some(item)
        }
        NodeShape::Array(_) | NodeShape::Scalar => None,
    }
}

impl SchemaBridge {
    /// Resolved schema of the field at `path`.
    ///
    /// The empty path is the schema root.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::FieldNotFound` if a segment does not exist, or a
    /// schema-class error if a node on the way cannot be resolved.
    pub fn get_field(&self, path: &str) -> Result<Value, BridgeError> {
        self.field_node(path).map(|node| node.as_ref().clone())
    }

    /// Immediate child field names of the field at `path`.
    ///
    /// Objects list their properties in declaration order. Arrays list the
    /// properties of their item schema; for tuples, the union across all
    /// positions in first-seen order. Scalars have no sub-fields.
    pub fn get_sub_fields(&self, path: &str) -> Result<Vec<String>, BridgeError> {
        let node = self.field_node(path)?;
        match NodeShape::of(&node) {
            NodeShape::Object { properties, .. } => Ok(property_names(properties)),
            NodeShape::Array(Items::Homogeneous(item)) => {
                let item = self.resolver().resolve(item)?;
                Ok(object_property_names(&item))
            }
            NodeShape::Array(Items::Tuple(items)) => {
                let mut names: Vec<String> = Vec::new();
                for item in items {
                    let item = self.resolver().resolve(item)?;
                    for name in object_property_names(&item) {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                Ok(names)
            }
            NodeShape::Array(Items::Unspecified) | NodeShape::Scalar => Ok(Vec::new()),
        }
    }

    /// Resolved node at `path`, cached per prefix.
    ///
    /// Cache keys spell an index under homogeneous `items` as `$`, so
    /// `friends.0.name` and `friends.9.name` share one entry.
    pub(crate) fn field_node(&self, path: &str) -> Result<Arc<Value>, BridgeError> {
        let mut current = Arc::clone(self.root());
        let mut key = String::new();
        for segment in split_path(path) {
            let keyed = match NodeShape::of(&current) {
                NodeShape::Array(Items::Homogeneous(_)) if is_index(segment) => WILDCARD,
                _ => segment,
            };
            key = join_path(&key, keyed);

            if let Some(hit) = self.cached_field(&key) {
                current = hit;
                continue;
            }
            let child = child_schema(&current, segment).ok_or_else(|| {
                BridgeError::FieldNotFound {
                    path: path.to_string(),
                    segment: segment.to_string(),
                }
            })?;
            let resolved = Arc::new(self.resolver().resolve(child)?);
            self.cache_field(&key, &resolved);
            current = resolved;
        }
        Ok(current)
    }
}

fn property_names(properties: Option<&serde_json::Map<String, Value>>) -> Vec<String> {
    properties
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

fn object_property_names(node: &Value) -> Vec<String> {
    match NodeShape::of(node) {
        NodeShape::Object { properties, .. } => property_names(properties),
        _ => Vec::new(),
    }
}
