//! Test reporter - display progress, diagnostics and the final summary

use colored::*;
use std::io::{self, Write};

/// Kind of report line, which decides its tag and styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// A test case is about to run
    Test,
    /// The current test case passed
    Passed,
    /// The current test case failed; text is the diagnostic
    Error,
    /// Untagged diagnostic body (captured output dumps)
    Detail,
    /// Summary: every test passed
    Success,
    /// Summary: at least one test failed
    Failure,
    /// An empty separator line
    Blank,
}

/// Destination for report lines
pub trait Reporter {
    fn emit(&mut self, kind: Emit, text: &str);
}

/// Reporter writing styled lines to stdout
pub struct ConsoleReporter {
    /// Disable colored output
    no_color: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self { no_color: false }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }
}

impl Reporter for ConsoleReporter {
    fn emit(&mut self, kind: Emit, text: &str) {
        let line = render(kind, text, !self.no_color);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

/// Render one report line with its tag
pub fn render(kind: Emit, text: &str, color: bool) -> String {
    let tag = match kind {
        Emit::Test => "[Test] ".blue().bold(),
        Emit::Passed => "[Passed]".green().bold(),
        Emit::Error => "[Error] ".red().bold(),
        Emit::Success => "[Success] ".green().bold(),
        Emit::Failure => "[Failure] ".red().bold(),
        Emit::Detail => return text.to_string(),
        Emit::Blank => return String::new(),
    };

    if color {
        format!("{}{}", tag, text)
    } else {
        format!("{}{}", tag.clear(), text)
    }
}

/// Suite name of a test script: its parent directory's name
pub fn suite_name(path: &std::path::Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Display name of a test case: file stem with underscores as spaces
pub fn case_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

#[cfg(test)]
pub mod recording {
    use super::{Emit, Reporter};

    /// Reporter that keeps every line for inspection
    #[derive(Debug, Default)]
    pub struct RecordingReporter {
        pub lines: Vec<(Emit, String)>,
    }

    impl RecordingReporter {
        pub fn kinds(&self) -> Vec<Emit> {
            self.lines.iter().map(|(kind, _)| *kind).collect()
        }

        pub fn text_of(&self, kind: Emit) -> Vec<&str> {
            self.lines
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, text)| text.as_str())
                .collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn emit(&mut self, kind: Emit, text: &str) {
            self.lines.push((kind, text.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn test_case_name_replaces_underscores() {
        assert_eq!(case_name(Path::new("tests/loops/while_with_break.hy")), "while with break");
        assert_eq!(case_name(Path::new("plain.hy")), "plain");
    }

    #[test]
    fn test_suite_name_is_parent_directory() {
        assert_eq!(suite_name(Path::new("tests/loops/while.hy")), "loops");
        assert_eq!(suite_name(Path::new("while.hy")), "");
    }

    #[test]
    fn test_render_without_color() {
        assert_eq!(render(Emit::Test, "Testing a > b", false), "[Test] Testing a > b");
        assert_eq!(render(Emit::Passed, "", false), "[Passed]");
        assert_eq!(render(Emit::Error, "Timed out", false), "[Error] Timed out");
        assert_eq!(
            render(Emit::Success, "All tests passed!", false),
            "[Success] All tests passed!"
        );
        assert_eq!(
            render(Emit::Failure, "1 of 2 tests passed", false),
            "[Failure] 1 of 2 tests passed"
        );
        assert_eq!(render(Emit::Detail, "raw", true), "raw");
        assert_eq!(render(Emit::Blank, "ignored", true), "");
    }

    #[test]
    fn test_console_reporter_no_color() {
        // Just verify it doesn't panic
        let mut reporter = ConsoleReporter::new().with_no_color(true);
        reporter.emit(Emit::Test, "Testing suite > case");
        reporter.emit(Emit::Passed, "");
    }
}
