//! Initial form values.

use serde_json::{Map, Value};

use crate::bridge::SchemaBridge;
use crate::error::BridgeError;
use crate::node::{Items, NodeShape};
use crate::path::join_path;
use crate::types::{InitialValueOptions, MAX_INITIAL_COUNT};

impl SchemaBridge {
    /// Initial value of the field at `path`.
    ///
    /// - scalars: the schema `default`, or `None` when there is none;
    /// - objects: the schema `default`, otherwise an empty object (nested
    ///   defaults are only produced when their own path is queried);
    /// - arrays: `initial_count` placeholder elements, each the initial value
    ///   of `<path>.<i>`. With a count of zero the schema `default` is used
    ///   if declared, otherwise an empty array.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InitialCountTooLarge` for an array field when
    /// `initial_count` exceeds [`MAX_INITIAL_COUNT`].
    pub fn get_initial_value(
        &self,
        path: &str,
        options: InitialValueOptions,
    ) -> Result<Option<Value>, BridgeError> {
        let node = self.field_node(path)?;
        let default = node.get("default");

        match NodeShape::of(&node) {
            NodeShape::Array(items) => {
                if options.initial_count == 0 {
                    if let Some(default) = default {
                        return Ok(Some(default.clone()));
                    }
                }

                if options.initial_count > MAX_INITIAL_COUNT {
                    return Err(BridgeError::InitialCountTooLarge {
                        path: path.to_string(),
                        count: options.initial_count,
                        max: MAX_INITIAL_COUNT,
                    });
                }

                let mut elements = Vec::new();
                for i in 0..options.initial_count {
                    let element = match items {
                        Items::Tuple(tuple) if i >= tuple.len() => None,
                        Items::Unspecified => None,
                        Items::Tuple(_) | Items::Homogeneous(_) => self.get_initial_value(
                            &join_path(path, &i.to_string()),
                            InitialValueOptions::default(),
                        )?,
                    };
                    elements.push(element.unwrap_or(Value::Null));
                }
                Ok(Some(Value::Array(elements)))
            }
            NodeShape::Object { .. } => Ok(Some(
                default
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            )),
            NodeShape::Scalar => Ok(default.cloned()),
        }
    }
}
