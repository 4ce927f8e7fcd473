//! tstest_core: Source-text primitives shared across the workspace.

pub mod text;
