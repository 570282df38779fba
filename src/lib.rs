//! Form Schema Bridge
//!
//! Path-addressable queries over a JSON Schema (draft-07) document for form
//! rendering layers.
//!
//! A [`SchemaBridge`] flattens `$ref`, `allOf` and nested object/array
//! schemas into one addressable tree. Fields are addressed with dotted paths
//! whose segments are property names, tuple indices, or the `$` wildcard
//! for "any array element".
//!
//! # Example
//!
//! ```
//! use form_schema_bridge::{BridgeOptions, InitialValueOptions, LogicalType, PropsOverrides, SchemaBridge};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "definitions": {
//!         "person": {
//!             "type": "object",
//!             "properties": { "firstName": { "type": "string", "default": "John" } },
//!             "required": ["firstName"]
//!         }
//!     },
//!     "type": "object",
//!     "properties": {
//!         "friends": { "type": "array", "items": { "$ref": "#/definitions/person" } }
//!     }
//! });
//!
//! let bridge = SchemaBridge::new(schema, BridgeOptions::default()).unwrap();
//!
//! assert_eq!(bridge.get_type("friends.$.firstName").unwrap(), LogicalType::Text);
//! assert_eq!(
//!     bridge.get_initial_value("friends", InitialValueOptions::with_count(1)).unwrap(),
//!     Some(json!([{}]))
//! );
//!
//! let props = bridge.get_props("friends.$.firstName", &PropsOverrides::new()).unwrap();
//! assert_eq!(props.label, "First name");
//! assert!(props.required);
//! ```
//!
//! # Path Segments
//!
//! | Node | Segment | Resolves to |
//! |------|---------|-------------|
//! | object | property name | that property's schema |
//! | array with tuple `items` | `0`..`n-1` | schema at that position |
//! | array with single `items` | index or `$` | the item schema |
//!
//! Any other combination is a [`BridgeError::FieldNotFound`].

mod bridge;
mod error;
mod error_mapper;
mod initial;
mod linter;
mod loader;
mod logical;
mod node;
mod options;
mod path;
mod props;
mod resolver;
mod types;
mod validator;

pub use bridge::SchemaBridge;
pub use error::{BridgeError, ErrorDetail, ErrorKind, LoadError, ValidateError};
pub use error_mapper::error_value;
pub use linter::{lint, Diagnostic, LintReport, Severity};
pub use loader::{is_url, load_schema, load_schema_auto, load_schema_str};
pub use node::{Items, NodeShape};
pub use options::{FieldOptions, MalformedOptions, OptionPair};
pub use path::{error_path, join_path, split_path};
pub use props::{title_case, FieldProps, PropsOverrides};
pub use resolver::SchemaResolver;
pub use types::{
    json_type_name, BridgeOptions, InitialValueOptions, LogicalType, MAX_INITIAL_COUNT,
    RENDER_HINTS_KEY, WILDCARD,
};
pub use validator::Validator;

#[cfg(feature = "remote")]
pub use loader::load_schema_url;
