//! Outcome of a test run

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tally across all suites of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    /// Suites run
    pub total: usize,
    /// One `<suite>: <step>: <failure>` line per failed suite, in run order
    pub failures: Vec<String>,
}

impl RunSummary {
    /// Record a suite that passed.
    pub fn record_pass(&mut self) {
        self.total += 1;
    }

    /// Record a suite that failed at `step`.
    pub fn record_failure(&mut self, suite: &str, step: &str, failure: &str) {
        self.total += 1;
        self.failures.push(format!("{suite}: {step}: {failure}"));
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.total - self.failures.len()
    }

    /// True if at least one suite ran and none failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.total > 0 && self.failures.is_empty()
    }
}
