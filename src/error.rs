//! Error types for schema bridging, loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Failure class of a [`BridgeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or unresolvable schema indirection.
    Schema,
    /// The requested path does not exist in the resolved tree.
    FieldNotFound,
    /// The field's declared type has no logical category.
    UnrepresentableType,
    /// A query option is out of range.
    InvalidOptions,
}

/// Errors raised by bridge queries.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid $ref at {location}: expected string, got {actual}")]
    InvalidRef { location: String, actual: String },

    #[error("unresolvable $ref \"{pointer}\"")]
    UnresolvedRef { pointer: String },

    #[error("circular $ref chain through \"{pointer}\"")]
    CircularRef { pointer: String },

    #[error("malformed allOf at {location}: {message}")]
    MalformedAllOf { location: String, message: String },

    #[error("field not found: \"{path}\" (no \"{segment}\" in parent schema)")]
    FieldNotFound { path: String, segment: String },

    #[error("field \"{path}\" can not be represented as a type {json_type}")]
    UnrepresentableType { path: String, json_type: String },

    #[error("initial count {count} for \"{path}\" exceeds the limit of {max}")]
    InitialCountTooLarge {
        path: String,
        count: usize,
        max: usize,
    },
}

impl BridgeError {
    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::InvalidRef { .. }
            | BridgeError::UnresolvedRef { .. }
            | BridgeError::CircularRef { .. }
            | BridgeError::MalformedAllOf { .. } => ErrorKind::Schema,
            BridgeError::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            BridgeError::UnrepresentableType { .. } => ErrorKind::UnrepresentableType,
            BridgeError::InitialCountTooLarge { .. } => ErrorKind::InvalidOptions,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading a schema or payload document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors during payload validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", details.len())]
    Invalid { details: Vec<ErrorDetail> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::Bridge(e) => e.exit_code(),
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }

    /// Render this error as the opaque error value accepted by
    /// `get_error`, `get_error_message` and `get_error_messages`.
    pub fn to_error_value(&self) -> serde_json::Value {
        match self {
            ValidateError::Invalid { details } => serde_json::json!({ "details": details }),
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }
}

/// Single per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    /// Dot-prefixed field path (e.g. `.friends.0.firstName`).
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_kinds() {
        let err = BridgeError::UnresolvedRef {
            pointer: "#/definitions/missing".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Schema);

        let err = BridgeError::FieldNotFound {
            path: "email.home".into(),
            segment: "home".into(),
        };
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unrepresentable_type_message_names_type() {
        let err = BridgeError::UnrepresentableType {
            path: "invalid".into(),
            json_type: "null".into(),
        };
        assert!(err
            .to_string()
            .contains("can not be represented as a type null"));
    }

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("schema.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert_eq!(LoadError::InvalidJson { source }.exit_code(), 2);
    }

    #[test]
    fn validate_error_exit_codes() {
        let err = ValidateError::Invalid {
            details: vec![ErrorDetail {
                path: ".age".into(),
                message: "expected integer".into(),
            }],
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn invalid_renders_details_payload() {
        let err = ValidateError::Invalid {
            details: vec![ErrorDetail {
                path: ".age".into(),
                message: "Zing!".into(),
            }],
        };
        assert_eq!(
            err.to_error_value(),
            serde_json::json!({ "details": [{ "path": ".age", "message": "Zing!" }] })
        );
    }

    #[test]
    fn error_detail_display() {
        let detail = ErrorDetail {
            path: ".email.work".into(),
            message: "is required".into(),
        };
        assert_eq!(detail.to_string(), ".email.work: is required");
    }
}
