//! tstest_engine: The interface the verifier requires from a type checker.
//!
//! The type-checking engine itself is a black box. These traits capture the
//! capabilities the verifier consumes: compile a program from root files
//! and an engine-specific options value, enumerate the files that were
//! loaded, produce per-file diagnostics at the syntactic, declaration, and
//! semantic phases plus whole-program options/config diagnostics, classify
//! standard-library and external-library files, and convert byte offsets
//! into line/character positions.
//!
//! Diagnostics cross this boundary as `Arc<Diagnostic>`: the verifier
//! deduplicates by pointer identity, so an engine that hands out the same
//! `Arc` from two diagnostic lists gets it reported once.

use std::sync::Arc;
use tstest_core::text::{LineAndCharacter, TextPos};
use tstest_diagnostics::Diagnostic;
use tstest_scanner::{scan_comments, CommentToken};

/// A source file loaded into a compiled program.
pub trait SourceFile {
    /// The file's path, slash-normalized, as the engine knows it.
    fn file_name(&self) -> &str;

    /// The complete source text of the file.
    fn full_text(&self) -> &str;

    /// Convert a byte offset into a 0-based line/character position.
    fn line_and_character_of(&self, pos: TextPos) -> LineAndCharacter;

    /// Scan the full text and yield every comment token, in source order.
    ///
    /// The default implementation runs the trivia-aware comment scanner
    /// over `full_text`. Engines whose own lexer retains comment trivia
    /// can override this to avoid the second scan.
    fn comments(&self) -> Vec<CommentToken> {
        scan_comments(self.full_text()).0
    }
}

/// A compiled program: the result of one engine invocation.
pub trait Program {
    type File: SourceFile;

    /// Every file loaded into the program: the root files plus everything
    /// pulled in transitively (libraries included).
    fn source_files(&self) -> Vec<&Self::File>;

    /// Diagnostics from lexing/parsing the given file.
    fn syntactic_diagnostics(&self, file: &Self::File) -> Vec<Arc<Diagnostic>>;

    /// Diagnostics from declaration emit for the given file.
    fn declaration_diagnostics(&self, file: &Self::File) -> Vec<Arc<Diagnostic>>;

    /// Diagnostics from type checking the given file.
    fn semantic_diagnostics(&self, file: &Self::File) -> Vec<Arc<Diagnostic>>;

    /// Whole-program diagnostics about the compiler options themselves.
    fn options_diagnostics(&self) -> Vec<Arc<Diagnostic>>;

    /// Whole-program diagnostics from parsing the configuration file.
    fn config_file_parsing_diagnostics(&self) -> Vec<Arc<Diagnostic>>;

    /// Whether the file is part of the engine's built-in standard library.
    fn is_default_library(&self, file: &Self::File) -> bool;

    /// Whether the file was loaded from an external dependency package.
    fn is_from_external_library(&self, file: &Self::File) -> bool;
}

/// A type-checking engine that can compile programs.
pub trait Engine {
    /// The engine's configuration object, passed through unmodified.
    type Options;
    /// The error the engine raises when it cannot build a program at all
    /// (unreadable file, invalid root path). Diagnostics are not errors.
    type Error: std::error::Error;
    type Program: Program;

    /// Compile the given root files into a program. Synchronous and
    /// blocking; expected to be safe to call repeatedly.
    fn create_program(
        &self,
        root_files: &[String],
        options: &Self::Options,
    ) -> Result<Self::Program, Self::Error>;
}
