//! The virtual file system.

use rustc_hash::FxHashMap;
use tstest_tspath::normalize_slashes;

/// An in-memory file system: a map from slash-normalized absolute paths to
/// file contents. Paths are compared as strings, so callers should add
/// files under the same absolute paths they later pass as fixture roots.
#[derive(Debug, Clone, Default)]
pub struct FileSystem {
    files: FxHashMap<String, String>,
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: add a file and return the file system.
    pub fn file(mut self, path: &str, text: &str) -> Self {
        self.add_file(path, text);
        self
    }

    /// Add a file.
    pub fn add_file(&mut self, path: &str, text: &str) {
        self.files.insert(normalize_slashes(path), text.to_string());
    }

    /// Read a file's contents.
    pub fn read(&self, path: &str) -> Option<&str> {
        self.files.get(&normalize_slashes(path)).map(String::as_str)
    }

    /// Whether a file exists.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(&normalize_slashes(path))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the file system is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_read() {
        let fs = FileSystem::new().file("/proj/a.ts", "const x = 1;");
        assert!(fs.contains("/proj/a.ts"));
        assert_eq!(fs.read("/proj/a.ts"), Some("const x = 1;"));
        assert_eq!(fs.read("/proj/missing.ts"), None);
    }

    #[test]
    fn test_backslash_paths_normalize() {
        let fs = FileSystem::new().file("C:\\proj\\a.ts", "x");
        assert!(fs.contains("C:/proj/a.ts"));
    }
}
