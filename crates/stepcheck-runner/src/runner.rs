//! Suite runner: discover test files and run each suite in turn

use std::path::{Path, PathBuf};

use stepcheck_core::suite::is_test_file;
use stepcheck_core::{ResolveError, RunSummary, SuiteError, Target, TestSuite};

use crate::events::RunObserver;
use crate::step::{self, StepError, StepOutcome, SuiteContext};

/// Runs test suites against a [`Target`].
pub struct SuiteRunner<T> {
    target: T,
}

impl<T: Target> SuiteRunner<T> {
    #[must_use]
    pub fn new(target: T) -> Self {
        Self { target }
    }

    /// Run every suite found at `path`, reporting progress to `observer`.
    ///
    /// Assertion failures are recorded in the summary and the run moves on
    /// to the next suite. Anything else aborts the run.
    ///
    /// # Errors
    ///
    /// Returns error if `path` cannot be read, a suite file is invalid, or a
    /// step cannot be carried out.
    pub fn run(&self, path: &Path, observer: &mut dyn RunObserver) -> Result<RunSummary, RunError> {
        let files = discover(path)?;
        tracing::info!(path = %path.display(), suites = files.len(), "running tests");

        let mut summary = RunSummary::default();
        for file in &files {
            self.run_suite(file, observer, &mut summary)?;
        }
        tracing::info!(total = summary.total, passed = summary.passed(), "run finished");
        Ok(summary)
    }

    fn run_suite(
        &self,
        path: &Path,
        observer: &mut dyn RunObserver,
        summary: &mut RunSummary,
    ) -> Result<(), RunError> {
        let suite = TestSuite::load(path)?;
        let name = suite.display_name(path);
        let ctx = SuiteContext::resolve(&suite, path).map_err(|source| {
            RunError::DefaultParameters {
                suite: name.clone(),
                source,
            }
        })?;

        tracing::info!(suite = %name, steps = suite.steps.len(), "running suite");
        observer.suite_started(&name, path);
        for (index, step) in suite.steps.iter().enumerate() {
            let step_name = step.display_name(index);
            observer.step_started(index, &step_name);

            let outcome =
                step::execute(step, &ctx, &self.target).map_err(|source| RunError::Step {
                    suite: name.clone(),
                    step: step_name.clone(),
                    source,
                })?;
            match outcome {
                StepOutcome::Passed => observer.step_passed(index, &step_name),
                StepOutcome::Failed(failure) => {
                    tracing::info!(suite = %name, step = %step_name, "{}", failure.short);
                    observer.step_failed(index, &step_name, &failure);
                    summary.record_failure(&name, &step_name, &failure.short);
                    return Ok(());
                }
            }
        }

        tracing::info!(suite = %name, "suite passed");
        observer.suite_passed(&name);
        summary.record_pass();
        Ok(())
    }
}

/// List the test files at `path`.
///
/// A directory yields its direct children whose names end in `.json`,
/// ordered by file name. A single test file yields itself. Anything else
/// yields nothing.
///
/// # Errors
///
/// Returns error if `path` does not exist or the directory cannot be listed.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>, RunError> {
    let meta =
        std::fs::metadata(path).map_err(|e| RunError::Path(path.to_path_buf(), e.to_string()))?;

    if !meta.is_dir() {
        return Ok(if is_test_file(path) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let entries =
        std::fs::read_dir(path).map_err(|e| RunError::Path(path.to_path_buf(), e.to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RunError::Path(path.to_path_buf(), e.to_string()))?;
        let file = entry.path();
        if !file.is_dir() && is_test_file(&file) {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed reading test path {0}: {1}")]
    Path(PathBuf, String),
    #[error(transparent)]
    Suite(#[from] SuiteError),
    #[error("Invalid default parameters in {suite}")]
    DefaultParameters {
        suite: String,
        #[source]
        source: ResolveError,
    },
    #[error("Failed to run {suite}: {step}")]
    Step {
        suite: String,
        step: String,
        #[source]
        source: StepError,
    },
}
