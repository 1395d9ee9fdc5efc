//! Suite walker - find test scripts in a directory tree and tally results

use std::ffi::OsStr;
use std::ops::{Add, AddAssign};
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Running count of executed and passed test cases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteTally {
    pub total: usize,
    pub passed: usize,
}

impl SuiteTally {
    /// Tally for a single test case
    pub fn single(passed: bool) -> Self {
        Self {
            total: 1,
            passed: usize::from(passed),
        }
    }

    /// Whether every counted test passed (vacuously true when empty)
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Number of failed tests
    pub fn failed(&self) -> usize {
        self.total - self.passed
    }
}

impl Add for SuiteTally {
    type Output = SuiteTally;

    fn add(self, other: SuiteTally) -> SuiteTally {
        SuiteTally {
            total: self.total + other.total,
            passed: self.passed + other.passed,
        }
    }
}

impl AddAssign for SuiteTally {
    fn add_assign(&mut self, other: SuiteTally) {
        *self = *self + other;
    }
}

/// Whether `path` names a test script with the given extension
pub fn is_test_file(path: &Path, extension: &str) -> bool {
    path.extension() == Some(OsStr::new(extension))
}

/// Run `check` on every test script under `root` and tally the verdicts.
///
/// Subdirectories are entered recursively in directory-listing order; files
/// with other extensions are skipped and not counted. Entries that cannot be
/// read are logged and skipped.
pub fn test_dir<F>(root: &Path, extension: &str, mut check: F) -> SuiteTally
where
    F: FnMut(&Path) -> bool,
{
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_test_file(entry.path(), extension))
        .fold(SuiteTally::default(), |tally, entry| {
            tally + SuiteTally::single(check(entry.path()))
        })
}
