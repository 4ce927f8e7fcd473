//! End-to-end verification tests.
//!
//! Drives `TypeTester::verify` against the scripted vfs engine with
//! recording `describe`/`it` callbacks, and asserts on the exact assertion
//! names and outcomes that reach the test sink.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;
use tstest_core::text::{LineAndCharacter, LineMap, TextPos};
use tstest_diagnostics::{messages, Diagnostic};
use tstest_engine::{Engine, Program, SourceFile};
use tstest_verify::{DescribeFn, ItFn, Options, TypeTester};
use tstest_vfs::{CompilerOptions, FileSystem, VfsEngine};

/// One recorded test case: the enclosing group path, the assertion name,
/// and the failure message if the assertion failed.
#[derive(Debug, Clone, PartialEq)]
struct Case {
    group: String,
    name: String,
    failure: Option<String>,
}

/// Build a tester whose callbacks record every group and case, in the
/// manner of a test framework adapter.
fn recording_tester<E: Engine>(engine: E) -> (TypeTester<E>, Rc<RefCell<Vec<Case>>>) {
    let cases: Rc<RefCell<Vec<Case>>> = Rc::new(RefCell::new(Vec::new()));
    let stack: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    let describe_stack = Rc::clone(&stack);
    let describe: DescribeFn = Box::new(move |description, body| {
        describe_stack.borrow_mut().push(description.to_string());
        body();
        describe_stack.borrow_mut().pop();
    });

    let it_stack = Rc::clone(&stack);
    let it_cases = Rc::clone(&cases);
    let it: ItFn = Box::new(move |description, body| {
        let failure = body().err().map(|error| error.to_string());
        it_cases.borrow_mut().push(Case {
            group: it_stack.borrow().join(" >> "),
            name: description.to_string(),
            failure,
        });
    });

    let tester = TypeTester::new(
        engine,
        Options {
            describe: Some(describe),
            it: Some(it),
        },
    );
    (tester, cases)
}

fn verify(fs: FileSystem, fixtures: &[&str], options: CompilerOptions) -> Vec<Case> {
    let (mut tester, cases) = recording_tester(VfsEngine::new(fs));
    tester.verify(fixtures, &options).expect("engine should succeed");
    drop(tester);
    Rc::try_unwrap(cases).unwrap().into_inner()
}

fn failures(cases: &[Case]) -> Vec<&Case> {
    cases.iter().filter(|c| c.failure.is_some()).collect()
}

// ============================================================================
// Clean fixtures
// ============================================================================

#[test]
fn test_clean_fixture_produces_no_assertions() {
    let fs = FileSystem::new().file("/proj/fixture.ts", "const x = 1;\nconst y = x + 1;\n");
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());
    assert!(cases.is_empty(), "unexpected cases: {:?}", cases);
}

// ============================================================================
// Expected errors
// ============================================================================

#[test]
fn test_matched_expectation_passes() {
    let fs = FileSystem::new().file(
        "/proj/fixture.ts",
        "declare function f(s: string): void;\nf(1); /* @raise 2345 */ // @expected 2345\n",
    );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].group, "fixture.ts");
    assert_eq!(cases[0].name, "should have an error TS2345 at L2.");
    assert_eq!(cases[0].failure, None);
}

#[test]
fn test_missing_expected_error_fails() {
    let fs = FileSystem::new().file("/proj/fixture.ts", "f(); // @expected 2345\n");
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].name, "should have an error TS2345 at L1.");
    assert!(cases[0].failure.is_some());
}

#[test]
fn test_expectations_report_in_scan_order() {
    let fs = FileSystem::new().file(
        "/proj/fixture.ts",
        "a(); /* @raise 2304 */ // @expected 2304\nb();\nc(); /* @raise 2339 */ // @expected 2339\n",
    );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "should have an error TS2304 at L1.",
            "should have an error TS2339 at L3.",
        ]
    );
    assert!(failures(&cases).is_empty());
}

#[test]
fn test_duplicate_expectations_share_one_display_key() {
    // Two identical markers on one line consume two diagnostics from the
    // pool, but collapse to a single display key (last write wins).
    let fs = FileSystem::new().file(
        "/proj/fixture.ts",
        "q(); /* @raise 2304 */ /* @raise 2304 */ /* @expected 2304 */ // @expected 2304\n",
    );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].name, "should have an error TS2304 at L1.");
    assert!(cases[0].failure.is_none());
}

// ============================================================================
// Unexpected errors
// ============================================================================

#[test]
fn test_unexpected_error_in_fixture_fails_with_location() {
    let fs = FileSystem::new().file(
        "/proj/fixture.ts",
        "declare function f(s: string): void;\nf(1); /* @raise 2345 */\n",
    );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].group, "fixture.ts");
    assert_eq!(cases[0].name, "should not have an error TS2345 at 2:7");
    let failure = cases[0].failure.as_deref().unwrap();
    assert!(failure.contains("not assignable"), "failure: {}", failure);
}

#[test]
fn test_line_mismatch_does_not_match() {
    let fs = FileSystem::new().file(
        "/proj/fixture.ts",
        "// @expected 2304\nbar; /* @raise 2304 */\n",
    );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "should have an error TS2304 at L1.",
            "should not have an error TS2304 at 2:6",
        ]
    );
    assert_eq!(failures(&cases).len(), 2);
}

#[test]
fn test_code_mismatch_on_same_line_does_not_match() {
    let fs = FileSystem::new().file(
        "/proj/fixture.ts",
        "baz(); /* @raise 2345 */ // @expected 2304\n",
    );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    let names: Vec<&str> = cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "should have an error TS2304 at L1.",
            "should not have an error TS2345 at 1:8",
        ]
    );
    assert_eq!(failures(&cases).len(), 2);
}

#[test]
fn test_two_fixtures_fail_independently() {
    let fs = FileSystem::new()
        .file("/proj/a.ts", "x; /* @raise 2304 */\n")
        .file("/proj/b.ts", "y; /* @raise 2304 */\n");
    let cases = verify(fs, &["/proj/a.ts", "/proj/b.ts"], CompilerOptions::default());

    let failed = failures(&cases);
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0].group, "a.ts");
    assert_eq!(failed[1].group, "b.ts");
    assert_eq!(failed[0].name, "should not have an error TS2304 at 1:4");
    assert_eq!(failed[1].name, "should not have an error TS2304 at 1:4");
}

// ============================================================================
// Dependency sources and excluded files
// ============================================================================

#[test]
fn test_error_in_dependency_source_is_reported() {
    let fs = FileSystem::new()
        .file("/proj/fixture.ts", "import { x } from \"./dep\";\n")
        .file(
            "/proj/dep.ts",
            "export const x = 1;\nbad; /* @raise 7006 */\n",
        );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    let failed = failures(&cases);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].group, "dep.ts");
    assert_eq!(failed[0].name, "should not have an error TS7006 at 2:6");
}

#[test]
fn test_expectation_markers_in_dependency_sources_are_ignored() {
    // Dependency sources are never annotated; a marker there neither
    // matches nor suppresses the diagnostic.
    let fs = FileSystem::new()
        .file("/proj/fixture.ts", "import { x } from \"./dep\";\n")
        .file(
            "/proj/dep.ts",
            "export const x = 1;\nbad; /* @raise 2304 */ // @expected 2304\n",
        );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    let failed = failures(&cases);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].group, "dep.ts");
    assert!(failed[0].name.starts_with("should not have an error TS2304"));
}

#[test]
fn test_external_library_files_are_excluded() {
    let fs = FileSystem::new()
        .file("/proj/fixture.ts", "import { ev } from \"events-shim\";\n")
        .file(
            "/proj/node_modules/events-shim/index.d.ts",
            "export declare const ev: number;\noops; /* @raise 2304 */\n",
        );
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());

    assert!(cases.is_empty(), "unexpected cases: {:?}", cases);
}

#[test]
fn test_warning_diagnostics_are_invisible() {
    // TS6133 is a warning-category diagnostic; the verifier only checks
    // error severity.
    let fs = FileSystem::new().file("/proj/fixture.ts", "const x = 1; /* @raise 6133 */\n");
    let cases = verify(fs, &["/proj/fixture.ts"], CompilerOptions::default());
    assert!(cases.is_empty());
}

// ============================================================================
// Group naming
// ============================================================================

#[test]
fn test_display_names_strip_common_ancestor() {
    let fs = FileSystem::new()
        .file("/proj/tests/a/x.ts", "u; /* @raise 2304 */\n")
        .file("/proj/tests/b/y.ts", "v; /* @raise 2304 */\n");
    let cases = verify(
        fs,
        &["/proj/tests/a/x.ts", "/proj/tests/b/y.ts"],
        CompilerOptions::default(),
    );

    let groups: Vec<&str> = cases.iter().map(|c| c.group.as_str()).collect();
    assert_eq!(groups, vec!["a/x.ts", "b/y.ts"]);
}

// ============================================================================
// Misc (whole-program) diagnostics
// ============================================================================

#[test]
fn test_invalid_lib_entry_fails_in_misc_group() {
    let fs = FileSystem::new().file("/proj/fixture.ts", "const x = 1;\n");
    let options = CompilerOptions {
        lib: Some(vec!["lib.nope.d.ts".to_string()]),
        ..Default::default()
    };
    let cases = verify(fs, &["/proj/fixture.ts"], options);

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].group, "(misc)");
    assert_eq!(cases[0].name, "should not have an error TS6046");
    assert!(cases[0].failure.is_some());
}

#[test]
fn test_misc_failure_count_is_independent_of_fixtures() {
    let fs = FileSystem::new()
        .file("/proj/a.ts", "p(); /* @raise 2304 */ // @expected 2304\n")
        .file("/proj/b.ts", "const x = 1;\n");
    let options = CompilerOptions {
        lib: Some(vec!["lib.nope.d.ts".to_string()]),
        ..Default::default()
    };
    let cases = verify(fs, &["/proj/a.ts", "/proj/b.ts"], options);

    let misc: Vec<&Case> = cases.iter().filter(|c| c.group == "(misc)").collect();
    assert_eq!(misc.len(), 1);
    assert_eq!(misc[0].name, "should not have an error TS6046");
}

#[test]
fn test_misc_group_runs_first() {
    let fs = FileSystem::new().file("/proj/fixture.ts", "w; /* @raise 2304 */\n");
    let options = CompilerOptions {
        lib: Some(vec!["lib.nope.d.ts".to_string()]),
        ..Default::default()
    };
    let cases = verify(fs, &["/proj/fixture.ts"], options);

    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].group, "(misc)");
    assert_eq!(cases[1].group, "fixture.ts");
}

// ============================================================================
// Engine failure
// ============================================================================

#[test]
fn test_engine_error_propagates_before_reporting() {
    let (mut tester, cases) = recording_tester(VfsEngine::new(FileSystem::new()));
    let result = tester.verify(&["/proj/missing.ts"], &CompilerOptions::default());

    assert!(result.is_err());
    assert!(cases.borrow().is_empty());
}

// ============================================================================
// Identity deduplication
// ============================================================================

struct NullFile;

impl SourceFile for NullFile {
    fn file_name(&self) -> &str {
        "/dev/null.ts"
    }

    fn full_text(&self) -> &str {
        ""
    }

    fn line_and_character_of(&self, _pos: TextPos) -> LineAndCharacter {
        LineAndCharacter::new(0, 0)
    }
}

struct MiscProgram {
    options_diagnostics: Vec<Arc<Diagnostic>>,
    config_diagnostics: Vec<Arc<Diagnostic>>,
}

impl Program for MiscProgram {
    type File = NullFile;

    fn source_files(&self) -> Vec<&NullFile> {
        Vec::new()
    }

    fn syntactic_diagnostics(&self, _file: &NullFile) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn declaration_diagnostics(&self, _file: &NullFile) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn semantic_diagnostics(&self, _file: &NullFile) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn options_diagnostics(&self) -> Vec<Arc<Diagnostic>> {
        self.options_diagnostics.clone()
    }

    fn config_file_parsing_diagnostics(&self) -> Vec<Arc<Diagnostic>> {
        self.config_diagnostics.clone()
    }

    fn is_default_library(&self, _file: &NullFile) -> bool {
        false
    }

    fn is_from_external_library(&self, _file: &NullFile) -> bool {
        false
    }
}

/// An engine that only produces whole-program diagnostics, for exercising
/// the (misc) group in isolation.
struct MiscEngine {
    options_diagnostics: Vec<Arc<Diagnostic>>,
    config_diagnostics: Vec<Arc<Diagnostic>>,
}

impl Engine for MiscEngine {
    type Options = ();
    type Error = Infallible;
    type Program = MiscProgram;

    fn create_program(
        &self,
        _root_files: &[String],
        _options: &(),
    ) -> Result<MiscProgram, Infallible> {
        Ok(MiscProgram {
            options_diagnostics: self.options_diagnostics.clone(),
            config_diagnostics: self.config_diagnostics.clone(),
        })
    }
}

#[test]
fn test_misc_diagnostics_dedup_by_shared_instance() {
    // The same instance handed out from both whole-program lists collapses
    // to one assertion; structurally equal but distinct instances do not.
    let shared = Arc::new(Diagnostic::new(
        &messages::UNKNOWN_COMPILER_OPTION_0,
        &["outDirs"],
    ));
    let twin_a = Arc::new(Diagnostic::new(
        &messages::UNKNOWN_COMPILER_OPTION_0,
        &["outFiles"],
    ));
    let twin_b = Arc::new(Diagnostic::new(
        &messages::UNKNOWN_COMPILER_OPTION_0,
        &["outFiles"],
    ));

    let engine = MiscEngine {
        options_diagnostics: vec![Arc::clone(&shared), twin_a],
        config_diagnostics: vec![shared, twin_b],
    };
    let (mut tester, cases) = recording_tester(engine);
    tester.verify(&["/proj/fixture.ts"], &()).unwrap();

    let cases = cases.borrow();
    assert_eq!(cases.len(), 3);
    assert!(cases.iter().all(|c| c.group == "(misc)"));
    assert!(cases
        .iter()
        .all(|c| c.name == "should not have an error TS5023"));
    let failures: Vec<&str> = cases
        .iter()
        .map(|c| c.failure.as_deref().unwrap())
        .collect();
    assert_eq!(
        failures,
        vec![
            "Unknown compiler option 'outDirs'.",
            "Unknown compiler option 'outFiles'.",
            "Unknown compiler option 'outFiles'.",
        ]
    );
}

// ============================================================================
// Diagnostics without positions
// ============================================================================

struct MarkedFile {
    name: String,
    text: String,
    line_map: LineMap,
}

impl SourceFile for MarkedFile {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn full_text(&self) -> &str {
        &self.text
    }

    fn line_and_character_of(&self, pos: TextPos) -> LineAndCharacter {
        self.line_map.line_and_character_of(pos)
    }
}

struct StartlessProgram {
    file: MarkedFile,
    diagnostic: Arc<Diagnostic>,
}

impl Program for StartlessProgram {
    type File = MarkedFile;

    fn source_files(&self) -> Vec<&MarkedFile> {
        vec![&self.file]
    }

    fn syntactic_diagnostics(&self, _file: &MarkedFile) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn declaration_diagnostics(&self, _file: &MarkedFile) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn semantic_diagnostics(&self, _file: &MarkedFile) -> Vec<Arc<Diagnostic>> {
        vec![Arc::clone(&self.diagnostic)]
    }

    fn options_diagnostics(&self) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn config_file_parsing_diagnostics(&self) -> Vec<Arc<Diagnostic>> {
        Vec::new()
    }

    fn is_default_library(&self, _file: &MarkedFile) -> bool {
        false
    }

    fn is_from_external_library(&self, _file: &MarkedFile) -> bool {
        false
    }
}

/// An engine whose only diagnostic carries a file but no start position.
struct StartlessEngine;

impl Engine for StartlessEngine {
    type Options = ();
    type Error = Infallible;
    type Program = StartlessProgram;

    fn create_program(
        &self,
        root_files: &[String],
        _options: &(),
    ) -> Result<StartlessProgram, Infallible> {
        let name = root_files[0].clone();
        let text = "y; // @expected 2304\n".to_string();
        let mut diagnostic = Diagnostic::new(&messages::CANNOT_FIND_NAME_0, &["y"]);
        diagnostic.file = Some(name.clone());
        Ok(StartlessProgram {
            file: MarkedFile {
                line_map: LineMap::new(&text),
                name,
                text,
            },
            diagnostic: Arc::new(diagnostic),
        })
    }
}

#[test]
fn test_positionless_diagnostic_never_matches_an_expectation() {
    // Matching requires a resolvable line, so a diagnostic with the right
    // code but no start position leaves the expectation unsatisfied and is
    // itself reported without a location suffix.
    let (mut tester, cases) = recording_tester(StartlessEngine);
    tester.verify(&["/proj/fixture.ts"], &()).unwrap();

    let cases = cases.borrow();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].group, "fixture.ts");
    assert_eq!(cases[0].name, "should have an error TS2304 at L1.");
    assert!(cases[0].failure.is_some());
    assert_eq!(cases[1].name, "should not have an error TS2304");
    assert_eq!(cases[1].failure.as_deref(), Some("Cannot find name 'y'."));
}

// ============================================================================
// Fallback callbacks
// ============================================================================

#[test]
fn test_fallback_callbacks_pass_silently_on_clean_fixture() {
    let fs = FileSystem::new().file("/proj/fixture.ts", "const x = 1;\n");
    let mut tester = TypeTester::new(VfsEngine::new(fs), Options::default());
    tester
        .verify(&["/proj/fixture.ts"], &CompilerOptions::default())
        .unwrap();
}

#[test]
#[should_panic(expected = "should not have an error TS2304")]
fn test_fallback_callbacks_panic_on_first_failure() {
    let fs = FileSystem::new().file("/proj/fixture.ts", "z; /* @raise 2304 */\n");
    let mut tester = TypeTester::new(VfsEngine::new(fs), Options::default());
    let _ = tester.verify(&["/proj/fixture.ts"], &CompilerOptions::default());
}
