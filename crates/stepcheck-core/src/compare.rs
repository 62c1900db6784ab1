//! Structural JSON comparison
//!
//! An expected value is a pattern, not an exact document:
//!
//! - objects match when every expected key is present in the actual object
//!   with a matching value (extra actual keys are ignored),
//! - arrays match element-wise and must have the same length,
//! - numbers match within an absolute tolerance of `1e-9`,
//! - everything else must be equal in type and value.
//!
//! Comparison stops at the first mismatch. Object keys are visited in sorted
//! order (`serde_json::Map` is ordered), so the reported mismatch is stable.

use serde_json::Value;

/// Absolute tolerance for number equality.
pub const NUMBER_TOLERANCE: f64 = 1e-9;

/// What kind of difference was found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// Actual value has a different JSON type
    Type,
    /// Same type, different value
    Value,
    /// Arrays of different length
    Length,
    /// Expected object key absent from the actual object
    MissingField,
}

/// First difference found between an expected pattern and an actual value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub kind: MismatchKind,
    /// Escaped pointer to the mismatch; empty for the document root
    pub path: String,
    /// One-line summary, e.g. `Unexpected value at /hits: 2`
    pub message: String,
    /// Companion line, e.g. `Expected: 1`; empty for missing fields
    pub expected: String,
}

impl Mismatch {
    /// Message followed by the expected annotation, when there is one.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.expected.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n{}", self.message, self.expected)
        }
    }
}

/// Compare `expected` against `actual` from the document root.
///
/// Returns `None` when `actual` matches.
#[must_use]
pub fn compare(expected: &Value, actual: &Value) -> Option<Mismatch> {
    compare_at(expected, actual, "")
}

/// Compare `expected` against `actual`, reporting paths below `path`.
#[must_use]
pub fn compare_at(expected: &Value, actual: &Value, path: &str) -> Option<Mismatch> {
    let (type_match, value_match) = match (expected, actual) {
        (Value::Null, Value::Null) => (true, true),
        (Value::Bool(e), Value::Bool(a)) => (true, e == a),
        (Value::Number(e), Value::Number(a)) => (true, numbers_match(e, a)),
        (Value::String(e), Value::String(a)) => (true, e == a),
        (Value::Array(e), Value::Array(a)) => {
            if e.len() != a.len() {
                return Some(Mismatch {
                    kind: MismatchKind::Length,
                    path: path.to_string(),
                    message: format!(
                        "Unexpected number of elements at {}: {}",
                        display_path(path),
                        a.len()
                    ),
                    expected: format!("Expected: {}", e.len()),
                });
            }
            for (i, (e, a)) in e.iter().zip(a).enumerate() {
                if let Some(m) = compare_at(e, a, &format!("{path}/{i}")) {
                    return Some(m);
                }
            }
            (true, true)
        }
        (Value::Object(e), Value::Object(a)) => {
            for (key, e) in e {
                let child = format!("{path}/{}", escape_token(key));
                let Some(a) = a.get(key) else {
                    return Some(Mismatch {
                        kind: MismatchKind::MissingField,
                        message: format!("Missing expected field at {child}"),
                        path: child,
                        expected: String::new(),
                    });
                };
                if let Some(m) = compare_at(e, a, &child) {
                    return Some(m);
                }
            }
            (true, true)
        }
        _ => (false, false),
    };

    if value_match {
        return None;
    }

    let kind = if type_match {
        MismatchKind::Value
    } else {
        MismatchKind::Type
    };
    let word = match kind {
        MismatchKind::Type => "type",
        _ => "value",
    };
    Some(Mismatch {
        kind,
        path: path.to_string(),
        message: format!(
            "Unexpected {word} at {}: {}",
            display_path(path),
            compact(actual)
        ),
        expected: format!("Expected: {}", compact(expected)),
    })
}

fn numbers_match(expected: &serde_json::Number, actual: &serde_json::Number) -> bool {
    match (expected.as_f64(), actual.as_f64()) {
        (Some(e), Some(a)) => (e - a).abs() < NUMBER_TOLERANCE,
        _ => false,
    }
}

/// Escape one object key as a pointer token (`~` → `~0`, `/` → `~1`).
#[must_use]
pub fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Path as shown in messages: the empty root pointer reads `root`.
fn display_path(path: &str) -> &str {
    if path.is_empty() { "root" } else { path }
}

fn compact(value: &Value) -> String {
    // Serializing a `Value` cannot fail: keys are always strings.
    serde_json::to_string(value).unwrap_or_default()
}
