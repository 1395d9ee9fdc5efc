//! Expected-output extraction from test script comments

/// One line of expected output, tied to the source line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedLine {
    /// Text after the marker, verbatim (trailing whitespace included)
    pub content: String,
    /// 1-based line number of the annotation in the script
    pub line: usize,
}

/// Ordered expected output of a test case
pub type Expectation = Vec<ExpectedLine>;

/// Collect every annotation in `source`, top to bottom.
///
/// A line contributes when it contains `marker`; the rest of the line after
/// the first occurrence is the expected content. Lines without the marker
/// contribute nothing, so a script with no annotations expects no output.
pub fn extract(source: &str, marker: &str) -> Expectation {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            line.find(marker).map(|found| ExpectedLine {
                content: line[found + marker.len()..].to_string(),
                line: index + 1,
            })
        })
        .collect()
}
