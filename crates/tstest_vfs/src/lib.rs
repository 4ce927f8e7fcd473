//! tstest_vfs: An in-memory scripted checker engine.
//!
//! A deterministic [`tstest_engine::Engine`] implementation over a virtual
//! file system, built for testing the verifier (and for downstream crates
//! that want hermetic verification tests). It does no real type checking:
//! diagnostics are scripted with `@raise` comment directives placed in the
//! source files themselves.
//!
//! ```ts
//! declare function f(s: string): void;
//! f(1); /* @raise 2345 */ // @expected 2345
//! ```
//!
//! The engine still behaves like a compiler host where the verifier can
//! observe it: root files must exist, `import` specifiers and
//! `/// <reference path="..." />` directives are loaded transitively,
//! `node_modules` packages classify as external libraries, `lib` entries
//! from [`CompilerOptions`] inject built-in default-library files, and an
//! unknown `lib` entry produces an options diagnostic.

mod fs;
mod options;
mod program;

pub use fs::FileSystem;
pub use options::CompilerOptions;
pub use program::{EngineError, VfsEngine, VfsProgram, VfsSourceFile};
