//! tstest_tspath: Path normalization and prefix computation.
//!
//! String-level path utilities in the style of TypeScript's
//! `src/compiler/path.ts`. Everything here is a pure string computation;
//! nothing touches the disk.

/// Convert backslashes to forward slashes.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Check if a path is rooted (absolute).
pub fn is_rooted(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let bytes = path.as_bytes();
    // Unix absolute path
    if bytes[0] == b'/' {
        return true;
    }
    // Windows absolute path (e.g., C:\)
    if bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'/' || bytes[2] == b'\\')
    {
        return true;
    }
    false
}

/// Get the directory path (everything before and including the last `/`).
pub fn get_directory_path(path: &str) -> String {
    let normalized = normalize_slashes(path);
    if let Some(last_slash) = normalized.rfind('/') {
        normalized[..=last_slash].to_string()
    } else {
        String::new()
    }
}

/// Get the base name (file name) from a path.
pub fn get_base_name(path: &str) -> &str {
    if let Some(last_slash) = path.rfind('/') {
        &path[last_slash + 1..]
    } else if let Some(last_slash) = path.rfind('\\') {
        &path[last_slash + 1..]
    } else {
        path
    }
}

/// Ensure a path ends with a directory separator.
pub fn ensure_trailing_directory_separator(path: &str) -> String {
    if path.ends_with('/') || path.ends_with('\\') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Remove a trailing directory separator.
pub fn remove_trailing_directory_separator(path: &str) -> &str {
    if path.len() > 1 && (path.ends_with('/') || path.ends_with('\\')) {
        &path[..path.len() - 1]
    } else {
        path
    }
}

/// Collapse `.` and `..` segments in a slash-normalized path.
fn reduce_path_segments(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&s) if s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }
    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Resolve a path against a base directory, producing an absolute
/// slash-normalized path with `.` and `..` segments collapsed.
/// Already-rooted paths ignore the base.
pub fn resolve_path_from(base: &str, path: &str) -> String {
    let path = normalize_slashes(path);
    if is_rooted(&path) {
        return reduce_path_segments(&path);
    }
    let base = normalize_slashes(base);
    reduce_path_segments(&format!(
        "{}{}",
        ensure_trailing_directory_separator(&base),
        path
    ))
}

/// Resolve a path against the process working directory.
pub fn resolve_path(path: &str) -> String {
    let cwd = std::env::current_dir()
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_default();
    resolve_path_from(&cwd, path)
}

/// Compute the longest common ancestor directory of a set of file paths.
///
/// Starts from the directory of the first path and walks each subsequent
/// path character by character; on the first mismatch the ancestor is
/// truncated to the last separator boundary seen before the mismatch. The
/// result ends with a separator when non-empty. Paths with no common
/// ancestor degrade to the empty string. This is a prefix computation over
/// strings, not a filesystem lookup.
pub fn get_common_ancestor(files: &[String]) -> String {
    let Some(first) = files.first() else {
        return String::new();
    };
    let mut ancestor =
        remove_trailing_directory_separator(&get_directory_path(first)).to_string();

    for file_path in &files[1..] {
        let path = file_path.as_bytes();
        let mut last_sep = 0;
        for (j, &byte) in ancestor.as_bytes().iter().enumerate() {
            if path.get(j) != Some(&byte) {
                ancestor.truncate(last_sep);
                break;
            }
            if byte == b'/' {
                last_sep = j;
            }
        }
    }

    if !ancestor.is_empty() && !ancestor.ends_with('/') {
        ancestor.push('/');
    }
    ancestor
}
