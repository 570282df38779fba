//! Schema linting - static checks of every reachable field.
//!
//! Walks properties, tuple positions and wildcard items from the root and
//! reports:
//! - unresolvable or circular `$ref`, malformed `allOf` (E001)
//! - malformed `options` declarations (E002)
//! - `type: null` fields that no form control can render (W001)

use serde::Serialize;
use serde_json::Value;

use crate::bridge::SchemaBridge;
use crate::node::{declared_type, Items, NodeShape};
use crate::options::FieldOptions;
use crate::path::join_path;
use crate::types::WILDCARD;

/// Walks are cut off at this many segments even without a repeated `$ref`.
const MAX_DEPTH: usize = 16;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// Field path of the finding (empty for the root).
    pub path: String,
    pub message: String,
}

/// Findings for one schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub fields_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }

    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        tracing::warn!(code, path, %message, "lint finding");
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            path: path.to_string(),
            message,
        });
    }
}

/// Lint every field reachable from the root of `bridge`.
pub fn lint(bridge: &SchemaBridge) -> LintReport {
    let mut report = LintReport::default();
    let mut chain: Vec<String> = vec!["#".to_string()];
    chain.extend(refs_of(bridge.document()).into_iter().map(str::to_string));
    check_field(bridge, "", 0, &mut chain, &mut report);
    report
}

/// `$ref` targets a raw schema points at, directly or through `allOf`.
fn refs_of(schema: &Value) -> Vec<&str> {
    let mut refs: Vec<&str> = schema.get("$ref").and_then(Value::as_str).into_iter().collect();
    if let Some(members) = schema.get("allOf").and_then(Value::as_array) {
        refs.extend(members.iter().flat_map(refs_of));
    }
    refs
}

/// Check the field at `path` and descend into its children.
///
/// `chain` holds the `$ref` targets entered on the way down. A child that
/// re-enters one of them is checked but not descended into.
fn check_field(
    bridge: &SchemaBridge,
    path: &str,
    depth: usize,
    chain: &mut Vec<String>,
    report: &mut LintReport,
) {
    report.fields_checked += 1;

    let node = match bridge.field_node(path) {
        Ok(node) => node,
        Err(e) => {
            report.push(Severity::Error, "E001", path, e.to_string());
            return;
        }
    };

    if declared_type(&node) == Some("null") {
        report.push(
            Severity::Warning,
            "W001",
            path,
            "type null can not be represented as a form field".to_string(),
        );
    }

    if let Some(options) = node.get("options") {
        if let Err(e) = FieldOptions::parse(options) {
            report.push(Severity::Error, "E002", path, e.to_string());
        }
    }

    if depth >= MAX_DEPTH {
        return;
    }

    let children: Vec<(String, &Value)> = match NodeShape::of(&node) {
        NodeShape::Object {
            properties: Some(properties),
            ..
        } => properties.iter().map(|(k, v)| (k.clone(), v)).collect(),
        NodeShape::Array(Items::Homogeneous(item)) => vec![(WILDCARD.to_string(), item)],
        NodeShape::Array(Items::Tuple(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        _ => Vec::new(),
    };
    for (segment, schema) in children {
        let child_path = join_path(path, &segment);
        let refs = refs_of(schema);
        if refs.iter().any(|r| chain.iter().any(|c| c.as_str() == *r)) {
            tracing::trace!(path = %child_path, "recursive $ref, not descending");
            check_field(bridge, &child_path, MAX_DEPTH, chain, report);
            continue;
        }

        let entered = refs.len();
        chain.extend(refs.into_iter().map(str::to_string));
        check_field(bridge, &child_path, depth + 1, chain, report);
        chain.truncate(chain.len() - entered);
    }
}
