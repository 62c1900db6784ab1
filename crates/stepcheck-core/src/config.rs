//! Project configuration: where the service under test lives

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configured cluster endpoints.
pub const ENDPOINTS_ENV: &str = "STEPCHECK_ENDPOINTS";

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL used when no cluster endpoints are configured
    #[serde(default = "default_target")]
    pub target: String,

    /// Query endpoint per cluster
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    /// HTTP headers added to every request (auth tokens, etc.)
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// Query endpoint of one cluster.
///
/// ```toml
/// [[endpoints]]
/// cluster = "default"
/// url = "https://default.my-app.example.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub cluster: String,
    pub url: String,
}

#[derive(Deserialize)]
struct EndpointList {
    endpoints: Vec<Endpoint>,
}

fn default_target() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            endpoints: Vec::new(),
            headers: HashMap::new(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.stepcheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".stepcheck.toml", ".stepcheck.json", "stepcheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// Replace endpoints with those in [`ENDPOINTS_ENV`], if set.
    ///
    /// # Errors
    ///
    /// Returns error if the variable is set but malformed
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        match std::env::var(ENDPOINTS_ENV) {
            Ok(json) => self.apply_endpoints_json(&json),
            Err(_) => Ok(()),
        }
    }

    /// Replace endpoints with `{"endpoints": [{"cluster": .., "url": ..}]}`.
    ///
    /// # Errors
    ///
    /// Returns error if `json` does not have that shape
    pub fn apply_endpoints_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let list: EndpointList = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(format!("{ENDPOINTS_ENV}: {e}")))?;
        tracing::debug!(count = list.endpoints.len(), "endpoints from environment");
        self.endpoints = list.endpoints;
        Ok(())
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# stepcheck configuration

# Service to test when no cluster endpoints are listed
target = "http://127.0.0.1:8080"

# Query endpoint per cluster (overridden by STEPCHECK_ENDPOINTS)
# [[endpoints]]
# cluster = "default"
# url = "https://default.my-app.example.com"

# HTTP headers added to every request
[headers]
# Authorization = "Bearer your-token-here"
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
