//! Expectation-marker extraction.
//!
//! A fixture declares the diagnostics it expects with comment markers:
//! the literal text `@expected`, at least one whitespace character, and a
//! run of decimal digits naming the diagnostic code. Comments without the
//! marker are inert, as are malformed markers (missing or non-numeric
//! code). Only the first marker in a comment token is recognized; one
//! comment yields at most one expectation.

use regex::Regex;
use std::sync::OnceLock;
use tstest_engine::SourceFile;

static EXPECTED_MARKER: OnceLock<Regex> = OnceLock::new();

fn expected_marker() -> &'static Regex {
    EXPECTED_MARKER.get_or_init(|| Regex::new(r"@expected\s+(\d+)").unwrap())
}

/// An expected diagnostic, extracted from a single comment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    /// The 0-based source line of the comment token's start position.
    pub line: u32,
    /// The expected diagnostic code.
    pub code: u32,
}

/// Extract every expectation from a fixture, in source order.
///
/// Single pass over the file's comment tokens; materialize the result if
/// it has to be traversed more than once. The expectation's line is the
/// line of the comment token's start, which for a marker buried deep in a
/// multi-line comment need not be the line of the marker text itself.
pub fn collect_expected_errors<F: SourceFile>(file: &F) -> impl Iterator<Item = Expectation> + '_ {
    file.comments().into_iter().filter_map(move |comment| {
        let captures = expected_marker().captures(&comment.text)?;
        let code: u32 = captures[1].parse().ok()?;
        Some(Expectation {
            line: file.line_and_character_of(comment.pos).line,
            code,
        })
    })
}
