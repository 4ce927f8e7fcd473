//! Comment token information produced by the scanner.

use tstest_core::text::{TextPos, TextSpan};

/// The kind of comment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// A `//` comment, running to the end of the line.
    SingleLine,
    /// A `/* */` comment, possibly spanning multiple lines.
    MultiLine,
}

/// A comment token scanned from source text.
#[derive(Debug, Clone)]
pub struct CommentToken {
    /// The kind of comment.
    pub kind: CommentKind,
    /// Start position in the source text (at the opening `/`).
    pub pos: TextPos,
    /// End position in the source text (exclusive).
    pub end: TextPos,
    /// The full text of the comment, including delimiters.
    pub text: String,
}

impl CommentToken {
    /// The span covered by this comment.
    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end)
    }
}
