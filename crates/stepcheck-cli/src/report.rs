//! Terminal rendering of run progress and the final tally

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use stepcheck_core::RunSummary;
use stepcheck_runner::{RunObserver, StepFailure};

/// Prints one progress line per suite: a dot per passed step, then `OK` or
/// the failure diagnostic.
pub struct TerminalReporter<W: Write> {
    out: W,
    previous_failed: bool,
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous_failed: false,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) {
        // best effort
        let _ = self.out.write_fmt(args);
        let _ = self.out.flush();
    }
}

impl<W: Write> RunObserver for TerminalReporter<W> {
    fn suite_started(&mut self, name: &str, _path: &Path) {
        if self.previous_failed {
            self.emit(format_args!("\n"));
            self.previous_failed = false;
        }
        self.emit(format_args!("Running {name}:"));
    }

    fn step_passed(&mut self, index: usize, _name: &str) {
        if index == 0 {
            self.emit(format_args!(" "));
        }
        self.emit(format_args!("."));
    }

    fn step_failed(&mut self, _index: usize, name: &str, failure: &StepFailure) {
        self.emit(format_args!(" Failed {name}:\n{}\n", failure.long));
        self.previous_failed = true;
    }

    fn suite_passed(&mut self, _name: &str) {
        self.emit(format_args!(" OK\n"));
    }
}

/// Final tally for terminal output.
pub fn summary_text(summary: &RunSummary, path: &Path) -> String {
    let mut text = String::new();
    if !summary.failures.is_empty() {
        let _ = writeln!(
            text,
            "\nFailed {} of {} tests:",
            summary.failures.len(),
            summary.total
        );
        for failure in &summary.failures {
            let _ = writeln!(text, "{failure}");
        }
    } else if summary.total == 0 {
        let _ = writeln!(text, "Failed to find any tests at {}", path.display());
    } else {
        let _ = writeln!(text, "\n{} tests completed successfully", summary.total);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(long: &str) -> StepFailure {
        StepFailure {
            short: long.lines().next().unwrap_or_default().to_string(),
            long: long.to_string(),
        }
    }

    fn rendered(reporter: TerminalReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn passing_suite_prints_dots_and_ok() {
        let mut r = TerminalReporter::new(Vec::new());
        r.suite_started("search", Path::new("search.json"));
        for i in 0..3 {
            r.step_started(i, "s");
            r.step_passed(i, "s");
        }
        r.suite_passed("search");
        assert_eq!(rendered(r), "Running search: ... OK\n");
    }

    #[test]
    fn failed_suite_separated_from_next() {
        let mut r = TerminalReporter::new(Vec::new());
        r.suite_started("a", Path::new("a.json"));
        r.step_passed(0, "step 1");
        r.step_failed(1, "step 2", &failure("Unexpected status code: 500\nExpected: 200"));
        r.suite_started("b", Path::new("b.json"));
        r.step_failed(0, "step 1", &failure("Missing expected field at /hits"));
        r.suite_started("c", Path::new("c.json"));
        r.step_passed(0, "step 1");
        r.suite_passed("c");

        insta::assert_snapshot!(rendered(r).trim_end(), @r"
        Running a: . Failed step 2:
        Unexpected status code: 500
        Expected: 200

        Running b: Failed step 1:
        Missing expected field at /hits

        Running c: . OK
        ");
    }

    #[test]
    fn summary_lists_failures() {
        let summary = RunSummary {
            total: 3,
            failures: vec!["b: step 2: Unexpected value at /hits: 2".into()],
        };
        assert_eq!(
            summary_text(&summary, Path::new("tests")),
            "\nFailed 1 of 3 tests:\nb: step 2: Unexpected value at /hits: 2\n"
        );
    }

    #[test]
    fn summary_without_tests() {
        assert_eq!(
            summary_text(&RunSummary::default(), Path::new("tests/system")),
            "Failed to find any tests at tests/system\n"
        );
    }

    #[test]
    fn summary_all_passed() {
        let summary = RunSummary {
            total: 2,
            failures: vec![],
        };
        assert_eq!(
            summary_text(&summary, Path::new(".")),
            "\n2 tests completed successfully\n"
        );
    }
}
