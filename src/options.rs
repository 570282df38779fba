//! Selectable value lists declared through the `options` keyword.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::json_type_name;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed options: {reason}")]
pub struct MalformedOptions {
    pub reason: String,
}

/// One `{label, value}` entry of a pair list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionPair {
    pub label: Value,
    pub value: Value,
}

/// Options as declared in a schema or supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldOptions {
    /// Ordered `{label, value}` pairs; values are allowed, labels displayed.
    PairList(Vec<OptionPair>),
    /// Ordered label -> value mapping; keys are allowed, values displayed.
    Mapping(Map<String, Value>),
}

impl FieldOptions {
    /// Parse an `options` declaration.
    ///
    /// A pair without `label` is labelled by its value.
    pub fn parse(value: &Value) -> Result<Self, MalformedOptions> {
        match value {
            Value::Object(map) => Ok(FieldOptions::Mapping(map.clone())),
            Value::Array(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let value = entry.get("value").ok_or_else(|| MalformedOptions {
                        reason: format!("entry {} has no value", i),
                    })?;
                    Ok(OptionPair {
                        label: entry.get("label").unwrap_or(value).clone(),
                        value: value.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldOptions::PairList),
            other => Err(MalformedOptions {
                reason: format!("expected array or object, got {}", json_type_name(other)),
            }),
        }
    }

    /// Values a form control may produce, in declaration order.
    pub fn allowed_values(&self) -> Vec<Value> {
        match self {
            FieldOptions::PairList(pairs) => pairs.iter().map(|p| p.value.clone()).collect(),
            FieldOptions::Mapping(map) => map.keys().cloned().map(Value::String).collect(),
        }
    }

    /// Display form of an allowed value.
    pub fn transform(&self, value: &Value) -> Option<Value> {
        match self {
            FieldOptions::PairList(pairs) => pairs
                .iter()
                .find(|p| &p.value == value)
                .map(|p| p.label.clone()),
            FieldOptions::Mapping(map) => map.get(value.as_str()?).cloned(),
        }
    }

    /// True when any numeric option value is not a whole number.
    pub fn has_fractional_values(&self) -> bool {
        let fractional = |v: &Value| v.as_f64().map_or(false, |f| f.fract() != 0.0);
        match self {
            FieldOptions::PairList(pairs) => pairs.iter().any(|p| fractional(&p.value)),
            FieldOptions::Mapping(map) => map.values().any(fractional),
        }
    }
}
