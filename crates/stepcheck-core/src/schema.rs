//! JSON Schema of the test-file format, for editor validation

use crate::suite::TestSuite;

/// Generate JSON Schema for test files.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(TestSuite);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
