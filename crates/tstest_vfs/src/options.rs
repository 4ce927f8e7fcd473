//! Compiler options for the scripted engine.
//!
//! A subset of the tsconfig.json `compilerOptions` schema. Only `lib` has
//! observable behavior here (library injection and validation); the rest
//! is carried so option objects round-trip through serde the way real
//! configurations do.

use serde::{Deserialize, Serialize};

/// Compiler options, matching the tsconfig.json schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub lib: Option<Vec<String>>,
    pub strict: Option<bool>,
    pub no_implicit_any: Option<bool>,
    pub strict_null_checks: Option<bool>,
    pub declaration: Option<bool>,
    pub skip_lib_check: Option<bool>,
}

impl CompilerOptions {
    /// Parse options from a JSON `compilerOptions` object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The built-in default-library files, keyed by `lib` entry name.
pub(crate) const LIB_FILES: &[(&str, &str)] = &[
    (
        "lib.es5.d.ts",
        "interface Object {}\ninterface Array<T> { length: number; }\ndeclare const NaN: number;\n",
    ),
    (
        "lib.es2015.d.ts",
        "interface Promise<T> {}\ninterface Map<K, V> {}\n",
    ),
    (
        "lib.dom.d.ts",
        "interface EventTarget {}\ninterface Document {}\ndeclare const document: Document;\n",
    ),
];

/// Look up the content of a built-in library file.
pub(crate) fn builtin_lib(name: &str) -> Option<&'static str> {
    LIB_FILES
        .iter()
        .find(|(lib_name, _)| *lib_name == name)
        .map(|(_, content)| *content)
}

/// The `lib` names accepted by this engine, for error messages.
pub(crate) fn known_lib_names() -> String {
    LIB_FILES
        .iter()
        .map(|(name, _)| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}
