//! Program creation: file loading, module resolution, and scripted
//! diagnostics.

use crate::fs::FileSystem;
use crate::options::{builtin_lib, known_lib_names, CompilerOptions};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tstest_core::text::{LineAndCharacter, LineMap, TextPos, TextSpan};
use tstest_diagnostics::{messages, Diagnostic, DiagnosticCategory, MessageText};
use tstest_engine::{Engine, Program, SourceFile};
use tstest_scanner::scan_comments;
use tstest_tspath::{
    get_directory_path, normalize_slashes, remove_trailing_directory_separator, resolve_path_from,
};

/// The engine failed to build a program at all. Diagnostics are not
/// errors; this is for unreadable roots and the like.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("File '{0}' not found.")]
    FileNotFound(String),
}

/// A source file loaded into a [`VfsProgram`].
#[derive(Debug)]
pub struct VfsSourceFile {
    name: String,
    text: String,
    line_map: LineMap,
    default_library: bool,
    external: bool,
}

impl VfsSourceFile {
    fn new(name: String, text: String, default_library: bool) -> Self {
        let external = name.contains("/node_modules/");
        let line_map = LineMap::new(&text);
        Self {
            name,
            text,
            line_map,
            default_library,
            external,
        }
    }
}

impl SourceFile for VfsSourceFile {
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

/// The phase a scripted diagnostic lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Syntactic,
    Declaration,
    Semantic,
}

/// A compiled program over the virtual file system.
#[derive(Default)]
pub struct VfsProgram {
    files: Vec<VfsSourceFile>,
    syntactic: FxHashMap<String, Vec<Arc<Diagnostic>>>,
    declaration: FxHashMap<String, Vec<Arc<Diagnostic>>>,
    semantic: FxHashMap<String, Vec<Arc<Diagnostic>>>,
    options_diagnostics: Vec<Arc<Diagnostic>>,
    config_diagnostics: Vec<Arc<Diagnostic>>,
}

impl VfsProgram {
    fn add_diagnostic(&mut self, phase: Phase, file: &str, diagnostic: Arc<Diagnostic>) {
        let map = match phase {
            Phase::Syntactic => &mut self.syntactic,
            Phase::Declaration => &mut self.declaration,
            Phase::Semantic => &mut self.semantic,
        };
        map.entry(file.to_string()).or_default().push(diagnostic);
    }
}

impl Program for VfsProgram {
    type File = VfsSourceFile;

    fn source_files(&self) -> Vec<&VfsSourceFile> {
        self.files.iter().collect()
    }

    fn syntactic_diagnostics(&self, file: &VfsSourceFile) -> Vec<Arc<Diagnostic>> {
        self.syntactic.get(&file.name).cloned().unwrap_or_default()
    }

    fn declaration_diagnostics(&self, file: &VfsSourceFile) -> Vec<Arc<Diagnostic>> {
        self.declaration.get(&file.name).cloned().unwrap_or_default()
    }

    fn semantic_diagnostics(&self, file: &VfsSourceFile) -> Vec<Arc<Diagnostic>> {
        self.semantic.get(&file.name).cloned().unwrap_or_default()
    }

    fn options_diagnostics(&self) -> Vec<Arc<Diagnostic>> {
        self.options_diagnostics.clone()
    }

    fn config_file_parsing_diagnostics(&self) -> Vec<Arc<Diagnostic>> {
        self.config_diagnostics.clone()
    }

    fn is_default_library(&self, file: &VfsSourceFile) -> bool {
        file.default_library
    }

    fn is_from_external_library(&self, file: &VfsSourceFile) -> bool {
        file.external
    }
}

/// A scripted checker engine over an in-memory file system.
#[derive(Debug, Clone)]
pub struct VfsEngine {
    fs: FileSystem,
}

impl VfsEngine {
    pub fn new(fs: FileSystem) -> Self {
        Self { fs }
    }
}

impl Engine for VfsEngine {
    type Options = CompilerOptions;
    type Error = EngineError;
    type Program = VfsProgram;

    fn create_program(
        &self,
        root_files: &[String],
        options: &CompilerOptions,
    ) -> Result<VfsProgram, EngineError> {
        let mut program = VfsProgram::default();
        program.options_diagnostics = validate_options(options);

        // Default-library files come first, as a compiler host would list
        // them; they are injected for every valid `lib` entry.
        let default_lib = vec!["lib.es5.d.ts".to_string()];
        let lib_names = options.lib.as_ref().unwrap_or(&default_lib);
        for name in lib_names {
            if let Some(content) = builtin_lib(name) {
                program.files.push(VfsSourceFile::new(
                    format!("/lib/{}", name),
                    content.to_string(),
                    true,
                ));
            }
        }

        // Roots, then everything they pull in, in discovery order.
        let mut queue: VecDeque<String> = VecDeque::new();
        for root in root_files {
            let path = normalize_slashes(root);
            if !self.fs.contains(&path) {
                return Err(EngineError::FileNotFound(path));
            }
            queue.push_back(path);
        }

        let mut visited: FxHashSet<String> = FxHashSet::default();
        while let Some(path) = queue.pop_front() {
            if !visited.insert(path.clone()) {
                continue;
            }
            let Some(text) = self.fs.read(&path) else {
                continue;
            };
            let text = text.to_string();

            for (specifier, range) in scan_import_specifiers(&text) {
                match resolve_specifier(&self.fs, &path, &specifier) {
                    Some(target) => queue.push_back(target),
                    None => {
                        let diagnostic = Arc::new(Diagnostic::with_location(
                            path.clone(),
                            TextSpan::from_bounds(range.start as TextPos, range.end as TextPos),
                            &messages::CANNOT_FIND_MODULE_0,
                            &[&specifier],
                        ));
                        program.add_diagnostic(Phase::Semantic, &path, diagnostic);
                    }
                }
            }

            program.files.push(VfsSourceFile::new(path, text, false));
        }

        collect_scripted_diagnostics(&mut program);
        Ok(program)
    }
}

/// Validate compiler options, producing options diagnostics for entries
/// the engine rejects.
fn validate_options(options: &CompilerOptions) -> Vec<Arc<Diagnostic>> {
    let mut diagnostics = Vec::new();
    if let Some(libs) = &options.lib {
        for name in libs {
            if builtin_lib(name).is_none() {
                diagnostics.push(Arc::new(Diagnostic::new(
                    &messages::ARGUMENT_FOR_0_OPTION_MUST_BE_1,
                    &["--lib", &known_lib_names()],
                )));
            }
        }
    }
    diagnostics
}

static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
static REFERENCE_RE: OnceLock<Regex> = OnceLock::new();
static RAISE_RE: OnceLock<Regex> = OnceLock::new();

fn import_re() -> &'static Regex {
    IMPORT_RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*(?:import|export)\b[^'"\n]*["']([^'"\n]+)["']"#).unwrap()
    })
}

fn reference_re() -> &'static Regex {
    REFERENCE_RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*///\s*<reference\s+path\s*=\s*["']([^'"\n]+)["']"#).unwrap()
    })
}

fn raise_re() -> &'static Regex {
    RAISE_RE
        .get_or_init(|| Regex::new(r"@raise(?:\s+(syntactic|declaration|semantic))?\s+(\d+)").unwrap())
}

/// Scan a file's text for import/export specifiers and reference-directive
/// paths, with the byte range of each specifier.
fn scan_import_specifiers(text: &str) -> Vec<(String, Range<usize>)> {
    let mut specifiers = Vec::new();
    for captures in import_re().captures_iter(text) {
        if let Some(m) = captures.get(1) {
            specifiers.push((m.as_str().to_string(), m.range()));
        }
    }
    for captures in reference_re().captures_iter(text) {
        if let Some(m) = captures.get(1) {
            specifiers.push((m.as_str().to_string(), m.range()));
        }
    }
    specifiers
}

/// Resolve an import specifier from a file. Relative specifiers resolve
/// against the importing file's directory, probing the path as written,
/// then with `.ts`, then with `.d.ts`. Bare specifiers walk `node_modules`
/// directories from the importing file upwards.
fn resolve_specifier(fs: &FileSystem, from_file: &str, specifier: &str) -> Option<String> {
    if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/') {
        let base = get_directory_path(from_file);
        let resolved = resolve_path_from(&base, specifier);
        for candidate in [
            resolved.clone(),
            format!("{}.ts", resolved),
            format!("{}.d.ts", resolved),
        ] {
            if fs.contains(&candidate) {
                return Some(candidate);
            }
        }
        return None;
    }

    let mut dir = get_directory_path(from_file);
    loop {
        let base = remove_trailing_directory_separator(&dir);
        let prefix = if base == "/" { "" } else { base };
        for candidate in [
            format!("{}/node_modules/{}/index.d.ts", prefix, specifier),
            format!("{}/node_modules/{}.d.ts", prefix, specifier),
        ] {
            if fs.contains(&candidate) {
                return Some(candidate);
            }
        }
        if base.is_empty() || base == "/" {
            return None;
        }
        dir = get_directory_path(base);
    }
}

/// Scan every loaded file for `@raise` directives and scanner diagnostics,
/// filling the program's per-phase diagnostic lists.
fn collect_scripted_diagnostics(program: &mut VfsProgram) {
    let mut scripted: Vec<(Phase, String, Arc<Diagnostic>)> = Vec::new();

    for file in &program.files {
        let (comments, scan_diagnostics) = scan_comments(&file.text);

        for mut diagnostic in scan_diagnostics.into_diagnostics() {
            diagnostic.file = Some(file.name.clone());
            scripted.push((Phase::Syntactic, file.name.clone(), Arc::new(diagnostic)));
        }

        for comment in &comments {
            let Some(captures) = raise_re().captures(&comment.text) else {
                continue;
            };
            let Ok(code) = captures[2].parse::<u32>() else {
                continue;
            };
            let phase = match captures.get(1).map(|m| m.as_str()) {
                Some("syntactic") => Phase::Syntactic,
                Some("declaration") => Phase::Declaration,
                _ => Phase::Semantic,
            };
            let (category, text) = match messages::for_code(code) {
                Some(template) => (template.category, template.message.to_string()),
                None => (
                    DiagnosticCategory::Error,
                    format!("Scripted diagnostic TS{}.", code),
                ),
            };
            let diagnostic = Arc::new(Diagnostic {
                file: Some(file.name.clone()),
                span: Some(comment.span()),
                message: MessageText::Plain(text),
                code,
                category,
            });
            scripted.push((phase, file.name.clone(), diagnostic));
        }
    }

    for (phase, file, diagnostic) in scripted {
        program.add_diagnostic(phase, &file, diagnostic);
    }
}
