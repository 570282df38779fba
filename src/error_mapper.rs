//! Translation of validator error payloads into per-field messages.
//!
//! Payloads come from a third-party validator, so malformed shapes degrade
//! to "no match" rather than failing.

use serde_json::Value;

use crate::bridge::SchemaBridge;
use crate::path::error_path;

/// Keys under which a payload may carry its detail list.
const DETAIL_LIST_KEYS: &[&str] = &["details", "errors"];

/// Keys under which a detail entry may carry its field path.
const DETAIL_PATH_KEYS: &[&str] = &["path", "dataPath"];

fn detail_list(error: &Value) -> Option<&Vec<Value>> {
    let map = error.as_object()?;
    DETAIL_LIST_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_array))
}

fn detail_path(entry: &Value) -> Option<&str> {
    DETAIL_PATH_KEYS
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
}

/// Opaque error value for a plain Rust error: `{"message": ...}`.
pub fn error_value<E: std::error::Error + ?Sized>(error: &E) -> Value {
    serde_json::json!({ "message": error.to_string() })
}

impl SchemaBridge {
    /// First detail entry of `error` addressed to the field at `path`.
    ///
    /// Returns the raw entry unmodified.
    pub fn get_error(&self, path: &str, error: Option<&Value>) -> Option<Value> {
        let details = detail_list(error?)?;
        let wanted = error_path(path);
        details
            .iter()
            .find(|entry| detail_path(entry) == Some(wanted.as_str()))
            .cloned()
    }

    /// Message of the detail entry addressed to `path`.
    ///
    /// A missing or `null` message is `None`; other non-string messages are
    /// rendered as JSON text.
    pub fn get_error_message(&self, path: &str, error: Option<&Value>) -> Option<String> {
        let entry = self.get_error(path, error)?;
        match entry.get("message")? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Every message carried by `error`, in order.
    ///
    /// A detail list yields one message per entry; a generic error object
    /// yields its `message`; an object with neither yields nothing; any other
    /// value is returned as its own message.
    pub fn get_error_messages(&self, error: Option<&Value>) -> Vec<Value> {
        let Some(error) = error else {
            return Vec::new();
        };
        if let Some(details) = detail_list(error) {
            return details
                .iter()
                .filter_map(|entry| entry.get("message").cloned())
                .collect();
        }
        match error {
            Value::Null => Vec::new(),
            Value::Object(map) => map.get("message").cloned().into_iter().collect(),
            other => vec![other.clone()],
        }
    }
}
