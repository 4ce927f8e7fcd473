//! tstest_scanner: A trivia-aware comment scanner.
//!
//! Parsers discard comment trivia; this scanner does the opposite. It makes
//! a single pass over full source text and yields every comment token with
//! its source positions, which is what expectation-marker extraction and
//! scripted-diagnostic directives need. String literals and the literal
//! parts of templates are skipped so that quoted `//` or `/*` sequences
//! are not mistaken for comments; `${...}` substitutions are scanned as
//! code, so comments inside them are yielded.

mod scanner;
mod token;

pub use scanner::{scan_comments, CommentScanner};
pub use token::{CommentKind, CommentToken};
