//! Inline-or-file fields
//!
//! `parameters` and `body` fields hold either JSON directly or a JSON string
//! naming a file next to the test file. Note the consequence: an inline body
//! can never be a bare JSON string, since any string is read as a file name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A field given inline or by reference to a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RefOrInline {
    /// File name, relative to the directory of the test file
    FileRef(PathBuf),
    /// JSON value embedded in the test file
    Inline(Value),
}

impl RefOrInline {
    /// Resolve to a JSON value, reading the referenced file if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the referenced file cannot be read or is not JSON.
    pub fn resolve(&self, base_dir: &Path) -> Result<Value, ResolveError> {
        match self {
            Self::Inline(value) => Ok(value.clone()),
            Self::FileRef(name) => {
                let path = base_dir.join(name);
                tracing::debug!(path = %path.display(), "reading referenced file");
                let content = std::fs::read(&path)
                    .map_err(|e| ResolveError::Read(path.clone(), e.to_string()))?;
                serde_json::from_slice(&content)
                    .map_err(|e| ResolveError::Json(path, e.to_string()))
            }
        }
    }
}

/// Resolve an optional body field; absent stays absent.
///
/// # Errors
///
/// Returns error if a referenced file cannot be read or is not JSON.
pub fn resolve_body(
    field: Option<&RefOrInline>,
    base_dir: &Path,
) -> Result<Option<Value>, ResolveError> {
    field.map(|f| f.resolve(base_dir)).transpose()
}

/// Resolve an optional parameters field to a flat string map.
///
/// Absent parameters resolve to an empty map.
///
/// # Errors
///
/// Returns error if a referenced file cannot be read, or if the value is not
/// an object whose values are all strings.
pub fn resolve_parameters(
    field: Option<&RefOrInline>,
    base_dir: &Path,
) -> Result<BTreeMap<String, String>, ResolveError> {
    let Some(field) = field else {
        return Ok(BTreeMap::new());
    };
    let value = field.resolve(base_dir).map_err(|e| match e {
        ResolveError::Json(_, msg) => ResolveError::Parameters(msg),
        other => other,
    })?;
    serde_json::from_value(value).map_err(|e| ResolveError::Parameters(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to read referenced file at '{0}': {1}")]
    Read(PathBuf, String),
    #[error("Referenced file at '{0}' is not valid JSON: {1}")]
    Json(PathBuf, String),
    #[error("request parameters must be JSON with only string values: {0}")]
    Parameters(String),
}
