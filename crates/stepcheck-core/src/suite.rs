//! Test-file model
//!
//! One JSON file is one suite: optional name, suite-wide defaults, and an
//! ordered list of request/expected-response steps.
//!
//! ```json
//! {
//!   "name": "feed and query",
//!   "defaults": { "cluster": "default", "parameters": { "timeout": "5s" } },
//!   "steps": [
//!     {
//!       "request": { "method": "POST", "uri": "/document/v1/ns/doc/docid/1", "body": "doc.json" },
//!       "response": { "code": 200 }
//!     },
//!     {
//!       "request": { "parameters": { "yql": "select * from doc where true" } },
//!       "response": { "body": { "root": { "fields": { "totalCount": 1 } } } }
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::reference::RefOrInline;

/// File-name suffix of test files.
pub const TEST_FILE_SUFFIX: &str = ".json";

/// HTTP method used when a step does not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// Request path used when a step does not give a URI.
pub const DEFAULT_URI: &str = "/search/";

/// Status code expected when a step does not give one.
pub const DEFAULT_CODE: u16 = 200;

/// A test file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TestSuite {
    /// Suite name; the file path is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Values applied to every step unless the step overrides them
    #[serde(default)]
    pub defaults: Defaults,
    /// Steps, run in order; at least one is required
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Suite-wide defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Defaults {
    /// Cluster used by steps that do not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// String parameters added to every request, inline or as a file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<RefOrInline>,
}

/// One request and the response it must produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub request: Request,
    #[serde(default)]
    pub response: ExpectedResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Request {
    /// Cluster to send the request to; overrides the suite default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    /// HTTP method (default `GET`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Path and optional query (default `/search/`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// String parameters appended to the query, inline or as a file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<RefOrInline>,
    /// JSON request body, inline or as a file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RefOrInline>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedResponse {
    /// Expected status code (default 200)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Expected body pattern, inline or as a file name; absent means unchecked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RefOrInline>,
}

impl TestSuite {
    /// Read and parse a test file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not a valid suite, or has
    /// no steps.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SuiteError::Io(path.to_path_buf(), e.to_string()))?;
        let suite: Self = serde_json::from_str(&content)
            .map_err(|e| SuiteError::Parse(path.to_path_buf(), e.to_string()))?;
        if suite.steps.is_empty() {
            return Err(SuiteError::NoSteps(path.to_path_buf()));
        }
        Ok(suite)
    }

    /// Name to report the suite under.
    #[must_use]
    pub fn display_name(&self, path: &Path) -> String {
        non_empty(self.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string())
    }
}

impl Step {
    /// Name to report the step under; `index` is zero-based.
    #[must_use]
    pub fn display_name(&self, index: usize) -> String {
        non_empty(self.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("step {}", index + 1))
    }
}

impl Request {
    #[must_use]
    pub fn method(&self) -> &str {
        non_empty(self.method.as_deref()).unwrap_or(DEFAULT_METHOD)
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        non_empty(self.uri.as_deref()).unwrap_or(DEFAULT_URI)
    }

    /// Step cluster, falling back to the suite default.
    #[must_use]
    pub fn cluster<'a>(&'a self, defaults: &'a Defaults) -> Option<&'a str> {
        non_empty(self.cluster.as_deref()).or_else(|| non_empty(defaults.cluster.as_deref()))
    }
}

impl ExpectedResponse {
    #[must_use]
    pub fn code(&self) -> u16 {
        match self.code {
            None | Some(0) => DEFAULT_CODE,
            Some(code) => code,
        }
    }
}

/// Returns true if the file name of `path` ends in `.json`.
///
/// A file named just `.json` counts.
#[must_use]
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(TEST_FILE_SUFFIX))
}

/// Directory that references in the suite at `path` are relative to.
#[must_use]
pub fn base_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("Failed to read test file at {0}: {1}")]
    Io(PathBuf, String),
    #[error("Failed to parse test file at {0}: {1}")]
    Parse(PathBuf, String),
    #[error("A test must have at least one step, but none were found in {0}")]
    NoSteps(PathBuf),
}
