//! Output validation - compare an interpreter run against its expectation

use crate::testing::expectation::ExpectedLine;
use crate::testing::runner::{ExecutionResult, RunError};
use thiserror::Error;

/// Why a single test case failed
///
/// The `Display` text is the one-line diagnostic shown next to the error tag.
#[derive(Debug, Error)]
pub enum CaseFailure {
    #[error("Failed to open file: {0}")]
    FileAccess(#[source] std::io::Error),

    #[error("Failed to run interpreter: {0}")]
    Run(#[from] RunError),

    #[error("Failed to decode output")]
    Decode,

    #[error("Timed out")]
    TimedOut,

    #[error("Test exited with error (exit code {code})")]
    ExitedWithError {
        code: i32,
        /// Normalized stdout, shown when non-empty
        stdout: String,
        /// Raw stderr, shown when non-empty
        stderr: String,
    },

    #[error("Incorrect number of output lines: expected {expected}, got {actual}")]
    LineCount { expected: usize, actual: usize },

    #[error("Incorrect output on line {line}: expected {expected}, got {actual}")]
    Mismatch {
        line: usize,
        expected: String,
        actual: String,
    },
}

/// CRLF to LF, then trim surrounding whitespace from the whole blob
pub fn normalize(output: &str) -> String {
    output.replace("\r\n", "\n").trim().to_string()
}

/// Split normalized output into lines; empty output has no lines
pub fn output_lines(normalized: &str) -> Vec<&str> {
    if normalized.is_empty() {
        Vec::new()
    } else {
        normalized.split('\n').collect()
    }
}

/// Check a run against its expectation.
///
/// Checks run in a fixed order and stop at the first failure: decoding,
/// timeout, exit status, line count, then line content.
pub fn validate(expected: &[ExpectedLine], result: &ExecutionResult) -> Result<(), CaseFailure> {
    let decoded = std::str::from_utf8(&result.stdout).map_err(|_| CaseFailure::Decode)?;
    let output = normalize(decoded);

    if result.timed_out {
        return Err(CaseFailure::TimedOut);
    }

    if result.exit_code != 0 {
        return Err(CaseFailure::ExitedWithError {
            code: result.exit_code,
            stdout: output,
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }

    let lines = output_lines(&output);
    if lines.len() != expected.len() {
        return Err(CaseFailure::LineCount {
            expected: expected.len(),
            actual: lines.len(),
        });
    }

    for (want, got) in expected.iter().zip(lines) {
        if want.content != got {
            return Err(CaseFailure::Mismatch {
                line: want.line,
                expected: want.content.clone(),
                actual: got.to_string(),
            });
        }
    }

    Ok(())
}
