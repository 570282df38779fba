//! `$ref` and `allOf` resolution.
//!
//! Definitions are indexed once by pointer string. A resolved node never
//! carries `$ref` or `allOf` at its top level; nested property and item
//! schemas are left untouched and resolved lazily as paths walk into them.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};

use crate::error::BridgeError;
use crate::types::json_type_name;

/// Definition containers indexed at construction.
const DEFINITION_KEYS: &[&str] = &["definitions", "$defs"];

/// Resolves `$ref` pointers and `allOf` composites against one document.
#[derive(Debug)]
pub struct SchemaResolver {
    document: Arc<Value>,
    /// Pointer string -> unresolved definition node.
    arena: HashMap<String, Value>,
    /// Pointer string -> fully resolved target. Write-once per pointer.
    memo: RwLock<HashMap<String, Arc<Value>>>,
}

impl SchemaResolver {
    pub fn new(document: Arc<Value>) -> Self {
        let mut arena = HashMap::new();
        for key in DEFINITION_KEYS {
            if let Some(defs) = document.get(*key).and_then(Value::as_object) {
                for (name, def) in defs {
                    arena.insert(format!("#/{}/{}", key, escape_pointer(name)), def.clone());
                }
            }
        }
        tracing::debug!(definitions = arena.len(), "indexed schema definitions");

        Self {
            document,
            arena,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// The document this resolver was built over.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Resolve a node: dereference `$ref`, merge `allOf`.
    ///
    /// # Errors
    ///
    /// Returns a schema-class `BridgeError` for missing or circular
    /// references and malformed `allOf` lists.
    pub fn resolve(&self, node: &Value) -> Result<Value, BridgeError> {
        self.resolve_inner(node, "#", &mut Vec::new())
    }

    /// Resolve the target of a `$ref` pointer, memoized by pointer string.
    pub fn resolve_pointer(&self, pointer: &str) -> Result<Arc<Value>, BridgeError> {
        self.resolve_pointer_inner(pointer, &mut Vec::new())
    }

    /// Number of memoized pointer targets.
    pub fn memoized(&self) -> usize {
        self.memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn resolve_inner(
        &self,
        node: &Value,
        location: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Value, BridgeError> {
        let Some(map) = node.as_object() else {
            return Ok(node.clone());
        };

        if let Some(reference) = map.get("$ref") {
            let pointer = reference.as_str().ok_or_else(|| BridgeError::InvalidRef {
                location: location.to_string(),
                actual: json_type_name(reference).to_string(),
            })?;
            let target = self.resolve_pointer_inner(pointer, visiting)?;

            // Sibling keys win; the target fills in what is missing.
            let mut merged: Map<String, Value> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "$ref")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if merged.contains_key("allOf") {
                merged = self.merge_all_of(&merged, location, visiting)?;
            }
            if let Value::Object(target) = target.as_ref() {
                for (k, v) in target {
                    merged.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
            return Ok(Value::Object(merged));
        }

        if map.contains_key("allOf") {
            return self
                .merge_all_of(map, location, visiting)
                .map(Value::Object);
        }

        Ok(node.clone())
    }

    fn resolve_pointer_inner(
        &self,
        pointer: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Arc<Value>, BridgeError> {
        if let Some(hit) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pointer)
        {
            tracing::trace!(pointer, "memoized $ref hit");
            return Ok(Arc::clone(hit));
        }

        if visiting.iter().any(|p| p == pointer) {
            return Err(BridgeError::CircularRef {
                pointer: pointer.to_string(),
            });
        }

        let target = self.lookup(pointer)?;
        visiting.push(pointer.to_string());
        let resolved = self.resolve_inner(target, pointer, visiting);
        visiting.pop();
        let resolved = Arc::new(resolved?);

        tracing::debug!(pointer, "resolved $ref");
        // Idempotent: a racing writer stores an equal value.
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pointer.to_string(), Arc::clone(&resolved));
        Ok(resolved)
    }

    fn lookup(&self, pointer: &str) -> Result<&Value, BridgeError> {
        if let Some(def) = self.arena.get(pointer) {
            return Ok(def);
        }

        let unresolved = || BridgeError::UnresolvedRef {
            pointer: pointer.to_string(),
        };
        let fragment = pointer.strip_prefix('#').ok_or_else(unresolved)?;
        if fragment.is_empty() {
            return Ok(self.document.as_ref());
        }
        self.document.pointer(fragment).ok_or_else(unresolved)
    }

    /// Merge an `allOf` node: own keys first, then every member in order.
    ///
    /// `properties` are unioned (later member wins on collision, keeping the
    /// first-declared position), `required` is unioned without duplicates,
    /// and every other key takes the later member's value.
    fn merge_all_of(
        &self,
        map: &Map<String, Value>,
        location: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Map<String, Value>, BridgeError> {
        let all_of_location = format!("{}/allOf", location);
        let members = match map.get("allOf") {
            Some(Value::Array(members)) => members,
            Some(other) => {
                return Err(BridgeError::MalformedAllOf {
                    location: all_of_location,
                    message: format!("expected array, got {}", json_type_name(other)),
                })
            }
            None => return Ok(map.clone()),
        };

        let mut merged = Map::new();
        let own: Map<String, Value> = map
            .iter()
            .filter(|(k, _)| k.as_str() != "allOf")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merge_into(&mut merged, &own);

        for (i, member) in members.iter().enumerate() {
            let member_location = format!("{}/{}", all_of_location, i);
            match self.resolve_inner(member, &member_location, visiting)? {
                Value::Object(resolved) => merge_into(&mut merged, &resolved),
                other => {
                    return Err(BridgeError::MalformedAllOf {
                        location: member_location,
                        message: format!("expected object, got {}", json_type_name(&other)),
                    })
                }
            }
        }

        Ok(merged)
    }
}

fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (key.as_str(), target.get_mut(key), value) {
            ("properties", Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (name, prop) in incoming {
                    existing.insert(name.clone(), prop.clone());
                }
            }
            ("required", Some(Value::Array(existing)), Value::Array(incoming)) => {
                for name in incoming {
                    if !existing.contains(name) {
                        existing.push(name.clone());
                    }
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Escape a definition name for use in a JSON Pointer (`~` -> `~0`, `/` -> `~1`).
fn escape_pointer(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver(schema: Value) -> SchemaResolver {
        SchemaResolver::new(Arc::new(schema))
    }

    #[test]
    fn resolves_definition_ref() {
        let r = resolver(json!({
            "definitions": { "firstName": { "type": "string", "default": "John" } }
        }));
        let resolved = r.resolve(&json!({ "$ref": "#/definitions/firstName" })).unwrap();
        assert_eq!(resolved, json!({ "type": "string", "default": "John" }));
    }

    #[test]
    fn resolves_defs_and_arbitrary_pointers() {
        let r = resolver(json!({
            "$defs": { "id": { "type": "integer" } },
            "properties": { "name": { "type": "string" } }
        }));
        assert_eq!(
            r.resolve(&json!({ "$ref": "#/$defs/id" })).unwrap(),
            json!({ "type": "integer" })
        );
        assert_eq!(
            r.resolve(&json!({ "$ref": "#/properties/name" })).unwrap(),
            json!({ "type": "string" })
        );
    }

    #[test]
    fn chained_refs_resolve_fully() {
        let r = resolver(json!({
            "definitions": {
                "a": { "$ref": "#/definitions/b" },
                "b": { "type": "boolean" }
            }
        }));
        assert_eq!(
            r.resolve(&json!({ "$ref": "#/definitions/a" })).unwrap(),
            json!({ "type": "boolean" })
        );
    }

    #[test]
    fn sibling_keys_win_over_target() {
        let r = resolver(json!({
            "definitions": { "name": { "type": "string", "title": "Name" } }
        }));
        let resolved = r
            .resolve(&json!({ "$ref": "#/definitions/name", "title": "Nickname" }))
            .unwrap();
        assert_eq!(resolved["title"], "Nickname");
        assert_eq!(resolved["type"], "string");
        assert!(resolved.get("$ref").is_none());
    }

    #[test]
    fn missing_ref_target_errors() {
        let r = resolver(json!({ "definitions": {} }));
        let err = r
            .resolve(&json!({ "$ref": "#/definitions/missing" }))
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnresolvedRef { pointer } if pointer == "#/definitions/missing"));
    }

    #[test]
    fn external_ref_errors() {
        let r = resolver(json!({}));
        let err = r.resolve(&json!({ "$ref": "other.json#/a" })).unwrap_err();
        assert!(matches!(err, BridgeError::UnresolvedRef { .. }));
    }

    #[test]
    fn non_string_ref_errors() {
        let r = resolver(json!({}));
        let err = r.resolve(&json!({ "$ref": 7 })).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidRef { actual, .. } if actual == "number"));
    }

    #[test]
    fn circular_ref_chain_fails_fast() {
        let r = resolver(json!({
            "definitions": {
                "a": { "$ref": "#/definitions/b" },
                "b": { "$ref": "#/definitions/a" }
            }
        }));
        let err = r.resolve(&json!({ "$ref": "#/definitions/a" })).unwrap_err();
        assert!(matches!(err, BridgeError::CircularRef { .. }));
    }

    #[test]
    fn recursive_definition_through_properties_is_not_a_cycle() {
        let r = resolver(json!({
            "definitions": {
                "node": {
                    "type": "object",
                    "properties": { "child": { "$ref": "#/definitions/node" } }
                }
            }
        }));
        let resolved = r.resolve(&json!({ "$ref": "#/definitions/node" })).unwrap();
        assert_eq!(
            resolved["properties"]["child"],
            json!({ "$ref": "#/definitions/node" })
        );
    }

    #[test]
    fn all_of_unions_properties_and_required() {
        let r = resolver(json!({
            "definitions": {
                "address": {
                    "type": "object",
                    "properties": { "city": { "type": "string" }, "street": { "type": "string" } },
                    "required": ["street", "city"]
                }
            }
        }));
        let resolved = r
            .resolve(&json!({
                "allOf": [
                    { "$ref": "#/definitions/address" },
                    {
                        "properties": { "type": { "enum": ["residential", "business"] } },
                        "required": ["type", "city"]
                    }
                ]
            }))
            .unwrap();

        let keys: Vec<&String> = resolved["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["city", "street", "type"]);
        assert_eq!(resolved["required"], json!(["street", "city", "type"]));
        assert_eq!(resolved["type"], "object");
        assert!(resolved.get("allOf").is_none());
    }

    #[test]
    fn all_of_later_member_wins_scalars_and_collisions() {
        let r = resolver(json!({}));
        let resolved = r
            .resolve(&json!({
                "allOf": [
                    { "type": "object", "properties": { "a": { "type": "string" } } },
                    { "type": "object", "properties": { "a": { "type": "integer" } }, "title": "T" }
                ]
            }))
            .unwrap();
        assert_eq!(resolved["properties"]["a"], json!({ "type": "integer" }));
        assert_eq!(resolved["title"], "T");
    }

    #[test]
    fn malformed_all_of_errors() {
        let r = resolver(json!({}));
        let err = r.resolve(&json!({ "allOf": { "type": "string" } })).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedAllOf { .. }));

        let err = r.resolve(&json!({ "allOf": [true] })).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedAllOf { location, .. } if location == "#/allOf/0"));
    }

    #[test]
    fn pointer_resolution_is_memoized() {
        let r = resolver(json!({
            "definitions": { "x": { "type": "string" } }
        }));
        assert_eq!(r.memoized(), 0);
        let first = r.resolve_pointer("#/definitions/x").unwrap();
        let second = r.resolve_pointer("#/definitions/x").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(r.memoized(), 1);
    }

    #[test]
    fn escaped_definition_names() {
        let r = resolver(json!({
            "definitions": { "a/b": { "type": "string" } }
        }));
        assert_eq!(
            r.resolve(&json!({ "$ref": "#/definitions/a~1b" })).unwrap(),
            json!({ "type": "string" })
        );
    }
}
