//! The verification driver.
//!
//! One `verify()` call compiles the fixtures once, classifies every file
//! in the resulting program, and runs the matching mode the classification
//! selects: fixture files are checked against their expectation markers,
//! project-local dependency sources are checked for leaked errors, and
//! standard-library/external-library files are skipped. A whole-program
//! `(misc)` group always runs first for options and config diagnostics.

use crate::expect::collect_expected_errors;
use crate::report::{report_expected_error, report_unexpected_error};
use crate::sink::{fallback_describe, fallback_it, DescribeFn, ItFn, Options};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tstest_diagnostics::Diagnostic;
use tstest_engine::{Engine, Program, SourceFile};
use tstest_tspath::{get_common_ancestor, normalize_slashes, resolve_path};

/// Verifies expected type errors in fixture files.
///
/// Holds no mutable state across calls besides the configured callbacks,
/// so repeated `verify()` calls are independent: each gets a fresh program
/// and fresh transient collections.
pub struct TypeTester<E: Engine> {
    engine: E,
    describe: DescribeFn,
    it: ItFn,
}

impl<E: Engine> TypeTester<E> {
    /// Initialize this instance with a checker engine and options. Omitted
    /// callbacks resolve to the immediate-execution fallbacks.
    pub fn new(engine: E, options: Options) -> Self {
        Self {
            engine,
            describe: options.describe.unwrap_or_else(fallback_describe),
            it: options.it.unwrap_or_else(fallback_it),
        }
    }

    /// Verify expected type errors.
    ///
    /// Resolves every fixture path, compiles them through the engine, and
    /// reports one assertion per expectation and per unexpected
    /// error-severity diagnostic. An engine failure propagates before any
    /// reporting occurs; diagnostics never abort verification.
    pub fn verify(
        &mut self,
        fixture_files: &[impl AsRef<str>],
        compiler_options: &E::Options,
    ) -> Result<(), E::Error> {
        let all_files: Vec<String> = fixture_files
            .iter()
            .map(|f| resolve_path(f.as_ref()))
            .collect();
        let program = self.engine.create_program(&all_files, compiler_options)?;
        let ancestor_len = get_common_ancestor(&all_files).len();
        let roots: FxHashSet<String> = all_files.iter().map(|f| normalize_slashes(f)).collect();

        let files = program.source_files();
        let files_by_name: FxHashMap<&str, &<E::Program as Program>::File> =
            files.iter().map(|f| (f.file_name(), *f)).collect();

        let describe = &mut self.describe;
        let it = &mut self.it;

        describe("(misc)", &mut || {
            verify_misc(&program, &files_by_name, it);
        });

        for file in &files {
            let file_name = file.file_name();
            // Display names strip the common-ancestor prefix; fall back to
            // the full name when the prefix does not apply to this file.
            let relative = file_name.get(ancestor_len..).unwrap_or(file_name);
            if roots.contains(&normalize_slashes(file_name)) {
                describe(relative, &mut || {
                    verify_fixture(&program, *file, &files_by_name, it);
                });
            } else if !program.is_default_library(file)
                && !program.is_from_external_library(file)
            {
                describe(relative, &mut || {
                    verify_source(&program, *file, &files_by_name, it);
                });
            }
        }
        Ok(())
    }
}

/// Collect error-severity diagnostics from the given lists, deduplicated
/// by pointer identity. Structurally equal but distinct diagnostics are
/// kept; only the same shared instance appearing twice collapses.
fn collect_error_diagnostics(
    lists: impl IntoIterator<Item = Vec<Arc<Diagnostic>>>,
) -> Vec<Arc<Diagnostic>> {
    let mut diagnostics: Vec<Arc<Diagnostic>> = Vec::new();
    for diagnostic in lists.into_iter().flatten() {
        if diagnostic.is_error()
            && !diagnostics.iter().any(|seen| Arc::ptr_eq(seen, &diagnostic))
        {
            diagnostics.push(diagnostic);
        }
    }
    diagnostics
}

/// Whole-program mode: options and config-parsing diagnostics are always
/// unexpected; there is no way to mark a configuration error intentional.
fn verify_misc<P: Program>(
    program: &P,
    files_by_name: &FxHashMap<&str, &P::File>,
    it: &mut ItFn,
) {
    let diagnostics = collect_error_diagnostics([
        program.options_diagnostics(),
        program.config_file_parsing_diagnostics(),
    ]);

    // Report.
    for diagnostic in &diagnostics {
        report_unexpected_error(diagnostic, files_by_name, it);
    }
}

/// Fixture mode: match the file's expectation markers against its error
/// diagnostics from all three phases; whatever the markers do not consume
/// is unexpected.
fn verify_fixture<P: Program>(
    program: &P,
    file: &P::File,
    files_by_name: &FxHashMap<&str, &P::File>,
    it: &mut ItFn,
) {
    let mut pool = collect_error_diagnostics([
        program.syntactic_diagnostics(file),
        program.declaration_diagnostics(file),
        program.semantic_diagnostics(file),
    ]);

    // Find @expected comments. Each expectation removes at most one
    // diagnostic from the pool; first match wins. A later expectation with
    // the same display key overwrites the earlier entry in place.
    let mut expected: IndexMap<String, Option<Arc<Diagnostic>>> = IndexMap::new();
    for expectation in collect_expected_errors(file) {
        let found = pool.iter().position(|d| {
            d.code == expectation.code
                && d.start()
                    .is_some_and(|start| file.line_and_character_of(start).line == expectation.line)
        });
        let matched = found.map(|index| pool.remove(index));
        expected.insert(
            format!("TS{} at L{}", expectation.code, expectation.line + 1),
            matched,
        );
    }

    // Report.
    for (key, diagnostic) in &expected {
        report_expected_error(key, diagnostic.as_ref(), it);
    }
    for diagnostic in &pool {
        report_unexpected_error(diagnostic, files_by_name, it);
    }
}

/// Dependency-source mode: project-local files pulled in transitively are
/// never annotated, so every error diagnostic in them is unexpected.
fn verify_source<P: Program>(
    program: &P,
    file: &P::File,
    files_by_name: &FxHashMap<&str, &P::File>,
    it: &mut ItFn,
) {
    let diagnostics = collect_error_diagnostics([
        program.syntactic_diagnostics(file),
        program.declaration_diagnostics(file),
        program.semantic_diagnostics(file),
    ]);

    // Report.
    for diagnostic in &diagnostics {
        report_unexpected_error(diagnostic, files_by_name, it);
    }
}
