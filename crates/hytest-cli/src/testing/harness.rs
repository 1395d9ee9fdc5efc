//! Per-file pipeline and summary
//!
//! For each test script: announce it, read it, extract the expectation, run
//! the interpreter, validate, and report. Any failure is confined to the
//! current case; the walk always continues.

use crate::testing::discovery::{self, SuiteTally};
use crate::testing::expectation;
use crate::testing::reporter::{case_name, suite_name, Emit, Reporter};
use crate::testing::runner::{ExecutionResult, RunError};
use crate::testing::validate::{validate, CaseFailure};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Executes one test script and captures its result
///
/// Implemented by [`crate::testing::ProcessRunner`]; tests substitute canned
/// results.
pub trait Execute {
    fn execute(&self, script: &Path) -> Result<ExecutionResult, RunError>;
}

impl Execute for crate::testing::ProcessRunner {
    fn execute(&self, script: &Path) -> Result<ExecutionResult, RunError> {
        self.run(script)
    }
}

/// A conformance run over one directory tree
pub struct Harness<E, R> {
    executor: E,
    reporter: R,
    extension: String,
    marker: String,
}

impl<E: Execute, R: Reporter> Harness<E, R> {
    /// Create a harness recognizing `extension` files with `marker` annotations
    pub fn new(
        executor: E,
        reporter: R,
        extension: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            reporter,
            extension: extension.into(),
            marker: marker.into(),
        }
    }

    /// Test every script under `root`
    pub fn run(&mut self, root: &Path) -> SuiteTally {
        let extension = self.extension.clone();
        discovery::test_dir(root, &extension, |path| self.check_file(path))
    }

    /// Run one test script, returning whether it passed
    pub fn check_file(&mut self, path: &Path) -> bool {
        self.reporter.emit(
            Emit::Test,
            &format!("Testing {} > {}", suite_name(path), case_name(path)),
        );

        match self.evaluate(path) {
            Ok(()) => {
                self.reporter.emit(Emit::Passed, "");
                true
            }
            Err(failure) => {
                debug!(path = %path.display(), ?failure, "test case failed");
                self.report_failure(&failure);
                false
            }
        }
    }

    /// Print the closing summary and return whether the run succeeded
    pub fn finish(&mut self, tally: SuiteTally) -> bool {
        if tally.total > 0 {
            self.reporter.emit(Emit::Blank, "");
        }

        if tally.all_passed() {
            self.reporter.emit(Emit::Success, "All tests passed!");
            true
        } else {
            self.reporter.emit(
                Emit::Failure,
                &format!("{} of {} tests passed", tally.passed, tally.total),
            );
            false
        }
    }

    #[cfg(test)]
    pub fn into_reporter(self) -> R {
        self.reporter
    }

    fn evaluate(&self, path: &Path) -> Result<(), CaseFailure> {
        let source = fs::read_to_string(path).map_err(CaseFailure::FileAccess)?;
        let expected = expectation::extract(&source, &self.marker);
        let result = self.executor.execute(path)?;
        validate(&expected, &result)
    }

    fn report_failure(&mut self, failure: &CaseFailure) {
        self.reporter.emit(Emit::Error, &failure.to_string());

        if let CaseFailure::ExitedWithError { stdout, stderr, .. } = failure {
            if !stdout.is_empty() {
                self.reporter.emit(Emit::Detail, "Output:");
                self.reporter.emit(Emit::Detail, stdout);
            }
            if !stderr.is_empty() {
                self.reporter.emit(Emit::Detail, "Error:");
                self.reporter.emit(Emit::Detail, stderr.trim_end_matches('\n'));
            }
        }
    }
}
