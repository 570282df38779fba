//! Payload validation against the bridge's schema.
//!
//! Adapter over `jsonschema` that honours the bridge configuration and
//! reports failures as [`ErrorDetail`]s in the bridge's error-path form.

use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;

use crate::bridge::SchemaBridge;
use crate::error::{BridgeError, ErrorDetail, ValidateError};
use crate::node::{Items, NodeShape};
use crate::path::{error_path, error_path_from_pointer, join_path};
use crate::types::WILDCARD;

/// Compiled validator for one bridge.
pub struct Validator<'b> {
    bridge: &'b SchemaBridge,
    compiled: jsonschema::Validator,
}

impl<'b> Validator<'b> {
    /// Compile the bridge's document as draft-07.
    ///
    /// # Errors
    ///
    /// Returns `ValidateError::InvalidSchema` if the document is not a valid
    /// JSON Schema.
    pub fn new(bridge: &'b SchemaBridge) -> Result<Self, ValidateError> {
        let compiled = jsonschema::draft7::new(bridge.document()).map_err(|e| {
            ValidateError::InvalidSchema {
                message: e.to_string(),
            }
        })?;
        Ok(Self { bridge, compiled })
    }

    /// Validate `payload`, returning it amended by `useDefaults` and
    /// `removeAdditional` when those are enabled.
    ///
    /// Only the first failure is reported unless `allErrors` is set.
    pub fn validate(&self, payload: &Value) -> Result<Value, ValidateError> {
        let options = self.bridge.options();
        let mut payload = payload.clone();
        if options.use_defaults || options.remove_additional {
            self.amend("", &mut payload)?;
        }

        let limit = if options.all_errors { usize::MAX } else { 1 };
        let details: Vec<ErrorDetail> = self
            .compiled
            .iter_errors(&payload)
            .take(limit)
            .map(|e| to_detail(&e))
            .collect();

        if details.is_empty() {
            Ok(payload)
        } else {
            tracing::debug!(failures = details.len(), "payload failed validation");
            Err(ValidateError::Invalid { details })
        }
    }

    /// Apply defaults and drop disallowed properties, depth first.
    fn amend(&self, path: &str, value: &mut Value) -> Result<(), BridgeError> {
        let options = self.bridge.options();
        let node = self.bridge.field_node(path)?;

        match (NodeShape::of(&node), value) {
            (NodeShape::Object { properties, .. }, Value::Object(map)) => {
                let Some(properties) = properties else {
                    return Ok(());
                };
                if options.remove_additional
                    && node.get("additionalProperties") == Some(&Value::Bool(false))
                {
                    map.retain(|key, _| properties.contains_key(key));
                }
                for name in properties.keys() {
                    let child_path = join_path(path, name);
                    if options.use_defaults && !map.contains_key(name) {
                        let child = self.bridge.field_node(&child_path)?;
                        if let Some(default) = child.get("default") {
                            map.insert(name.clone(), default.clone());
                        }
                    }
                    if let Some(child) = map.get_mut(name) {
                        self.amend(&child_path, child)?;
                    }
                }
            }
            (NodeShape::Array(items), Value::Array(elements)) => {
                for (i, element) in elements.iter_mut().enumerate() {
                    let segment = match items {
                        Items::Tuple(tuple) if i < tuple.len() => i.to_string(),
                        Items::Homogeneous(_) => WILDCARD.to_string(),
                        _ => continue,
                    };
                    self.amend(&join_path(path, &segment), element)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Attribute a failure to a field. A missing required property is reported
/// on the property itself rather than on its parent object.
fn to_detail(error: &ValidationError<'_>) -> ErrorDetail {
    let mut path = error_path_from_pointer(&error.instance_path.to_string());
    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            path.push_str(&error_path(name));
        }
    }
    ErrorDetail {
        path,
        message: error.to_string(),
    }
}
