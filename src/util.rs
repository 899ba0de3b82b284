//! File-list construction with recursive directory expansion.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Expand a directory into the regular files beneath it, recursively.
///
/// Symlinks are not followed, so cyclic links cannot loop the walk; symlink
/// entries are excluded from the result.
pub fn create_file_list(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            e.io_error()
                .map(|io_err| io::Error::new(io_err.kind(), e.to_string()))
                .unwrap_or_else(|| io::Error::other(e.to_string()))
        })?;
        if entry.file_type().is_file() {
            result.push(entry.into_path());
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walks_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"b").unwrap();

        let mut names: Vec<String> = create_file_list(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["a.txt", "b.txt"]);
    }

    #[test]
    fn empty_directory_yields_empty_list() {
        let dir = TempDir::new().unwrap();
        assert!(create_file_list(dir.path()).unwrap().is_empty());
    }
}
