//! The comment scanner.
//!
//! Scans byte by byte; every multi-byte UTF-8 sequence consists of bytes
//! above 0x7F, so comparing against ASCII delimiters is safe and all
//! positions are byte offsets.

use crate::token::{CommentKind, CommentToken};
use tstest_core::text::{TextPos, TextSpan};
use tstest_diagnostics::{messages, Diagnostic, DiagnosticCollection};

/// Scans source text for comment tokens, skipping everything else.
pub struct CommentScanner<'a> {
    /// The source text being scanned.
    text: &'a [u8],
    /// Current position in the text.
    pos: usize,
    /// Open `${...}` template substitutions, innermost last; each entry
    /// counts the unmatched `{` braces inside that substitution.
    template_stack: Vec<u32>,
    /// Accumulated diagnostics (unterminated comments).
    diagnostics: DiagnosticCollection,
}

impl<'a> CommentScanner<'a> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            pos: 0,
            template_stack: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Get the current position.
    #[inline]
    pub fn pos(&self) -> TextPos {
        self.pos as TextPos
    }

    /// Take the accumulated diagnostics, leaving the collection empty.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Scan forward to the next comment token. Returns `None` at end of
    /// text. Named to stay clear of `Iterator::scan`, which an owned
    /// receiver would otherwise resolve to.
    pub fn scan_comment(&mut self) -> Option<CommentToken> {
        while self.pos < self.text.len() {
            match self.text[self.pos] {
                b'/' if self.peek(1) == Some(b'/') => {
                    return Some(self.scan_single_line_comment());
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    return Some(self.scan_multi_line_comment());
                }
                quote @ (b'"' | b'\'') => self.skip_string(quote),
                b'`' => {
                    self.pos += 1;
                    self.skip_template_literal();
                }
                b'{' if !self.template_stack.is_empty() => {
                    if let Some(depth) = self.template_stack.last_mut() {
                        *depth += 1;
                    }
                    self.pos += 1;
                }
                b'}' if !self.template_stack.is_empty() => {
                    self.pos += 1;
                    match self.template_stack.last_mut() {
                        Some(depth) if *depth == 0 => {
                            self.template_stack.pop();
                            self.skip_template_literal();
                        }
                        Some(depth) => *depth -= 1,
                        None => {}
                    }
                }
                _ => self.pos += 1,
            }
        }
        None
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<u8> {
        self.text.get(self.pos + offset).copied()
    }

    fn scan_single_line_comment(&mut self) -> CommentToken {
        let start = self.pos;
        while self.pos < self.text.len() && self.text[self.pos] != b'\n' {
            self.pos += 1;
        }
        // Exclude a \r\n line ending from the token text.
        let mut end = self.pos;
        if end > start && self.text[end - 1] == b'\r' {
            end -= 1;
        }
        self.make_token(CommentKind::SingleLine, start, end)
    }

    fn scan_multi_line_comment(&mut self) -> CommentToken {
        let start = self.pos;
        self.pos += 2;
        while self.pos < self.text.len() {
            if self.text[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return self.make_token(CommentKind::MultiLine, start, self.pos);
            }
            self.pos += 1;
        }
        // Unterminated block comment: the token runs to end of text.
        let mut diagnostic = Diagnostic::new(&messages::ASTERISK_SLASH_EXPECTED, &[]);
        diagnostic.span = Some(TextSpan::from_bounds(start as TextPos, self.pos as TextPos));
        self.diagnostics.add(diagnostic);
        self.make_token(CommentKind::MultiLine, start, self.pos)
    }

    fn skip_string(&mut self, quote: u8) {
        self.pos += 1;
        while self.pos < self.text.len() {
            match self.text[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => break,
                b if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skip the literal part of a template, entered just past the opening
    /// backtick or a substitution's closing brace. Stops after the closing
    /// backtick, or after `${`, which opens a substitution the main loop
    /// scans as ordinary code so comments inside it are still yielded.
    fn skip_template_literal(&mut self) {
        while self.pos < self.text.len() {
            match self.text[self.pos] {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.template_stack.push(0);
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn make_token(&self, kind: CommentKind, start: usize, end: usize) -> CommentToken {
        CommentToken {
            kind,
            pos: start as TextPos,
            end: end as TextPos,
            text: String::from_utf8_lossy(&self.text[start..end]).into_owned(),
        }
    }
}

impl Iterator for CommentScanner<'_> {
    type Item = CommentToken;

    fn next(&mut self) -> Option<CommentToken> {
        self.scan_comment()
    }
}

/// Scan the full text and return every comment token plus any diagnostics
/// the scanner produced.
pub fn scan_comments(text: &str) -> (Vec<CommentToken>, DiagnosticCollection) {
    let mut scanner = CommentScanner::new(text);
    let mut comments = Vec::new();
    while let Some(comment) = scanner.scan_comment() {
        comments.push(comment);
    }
    (comments, scanner.take_diagnostics())
}
