//! The schema bridge: one instance per schema document.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::error::BridgeError;
use crate::resolver::SchemaResolver;
use crate::types::BridgeOptions;

/// Path-addressable query surface over a JSON Schema document.
///
/// Construction resolves the document root once. Every query afterwards is
/// a pure function of the resolved tree and its arguments; the only shared
/// state is an additive cache of resolved nodes, so a bridge can be queried
/// from several threads at once.
#[derive(Debug)]
pub struct SchemaBridge {
    resolver: SchemaResolver,
    options: BridgeOptions,
    root: Arc<Value>,
    /// Field path -> resolved node.
    fields: RwLock<HashMap<String, Arc<Value>>>,
}

impl SchemaBridge {
    /// Build a bridge over `schema`.
    ///
    /// # Errors
    ///
    /// Returns a schema-class `BridgeError` if the root itself cannot be
    /// resolved.
    pub fn new(schema: Value, options: BridgeOptions) -> Result<Self, BridgeError> {
        let document = Arc::new(schema);
        let resolver = SchemaResolver::new(Arc::clone(&document));
        let root = Arc::new(resolver.resolve(&document)?);
        tracing::debug!(?options, "schema bridge constructed");

        Ok(Self {
            resolver,
            options,
            root,
            fields: RwLock::new(HashMap::new()),
        })
    }

    /// The schema document as supplied.
    pub fn document(&self) -> &Value {
        self.resolver.document()
    }

    /// The configuration forwarded to the validator.
    pub fn options(&self) -> BridgeOptions {
        self.options
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    pub(crate) fn root(&self) -> &Arc<Value> {
        &self.root
    }

    pub(crate) fn cached_field(&self, path: &str) -> Option<Arc<Value>> {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    #[cfg(test)]
    pub(crate) fn cached_fields(&self) -> usize {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn cache_field(&self, path: &str, node: &Arc<Value>) {
        self.fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), Arc::clone(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_is_resolved_at_construction() {
        let bridge = SchemaBridge::new(
            json!({
                "definitions": { "person": { "type": "object", "properties": {} } },
                "$ref": "#/definitions/person"
            }),
            BridgeOptions::default(),
        )
        .unwrap();
        assert_eq!(bridge.root()["type"], "object");
        assert!(bridge.root().get("$ref").is_none());
    }

    #[test]
    fn unresolvable_root_fails_construction() {
        let result = SchemaBridge::new(
            json!({ "$ref": "#/definitions/nowhere" }),
            BridgeOptions::default(),
        );
        assert!(matches!(result, Err(BridgeError::UnresolvedRef { .. })));
    }

    #[test]
    fn keeps_options_and_document() {
        let schema = json!({ "type": "object" });
        let options = BridgeOptions::new().all_errors(true);
        let bridge = SchemaBridge::new(schema.clone(), options).unwrap();
        assert_eq!(bridge.document(), &schema);
        assert!(bridge.options().all_errors);
    }

    #[test]
    fn bridge_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaBridge>();
    }
}
