//! Enumerates the files of a directory for batch extraction.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Suffixes to keep, with or without the leading dot. Empty keeps all.
    pub extensions: Vec<String>,
    /// Glob patterns for paths to skip.
    pub exclude: Vec<String>,
}

pub fn list_files(dir: &Path, opts: &ScanOptions) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }
    let exclude_set = build_globset(&opts.exclude)?;
    let extensions: Vec<&str> = opts
        .extensions
        .iter()
        .map(|e| e.trim_start_matches('.'))
        .collect();

    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if !opts.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| !is_excluded(e.path(), &exclude_set))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_extension(path, &extensions) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    debug!("Found {} file(s) in {}", files.len(), dir.display());
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| Error::InvalidArgument(format!("bad exclude glob {pat:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::InvalidArgument(format!("bad exclude globs: {e}")))
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
        || path
            .file_name()
            .map(|name| excludes.is_match(name))
            .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();
        fs::write(temp.path().join("a.log"), "a").unwrap();
        fs::create_dir_all(temp.path().join("nested/deeper")).unwrap();
        fs::write(temp.path().join("nested/c.txt"), "c").unwrap();
        fs::write(temp.path().join("nested/deeper/d.txt"), "d").unwrap();
        temp
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn flat_listing_is_sorted_and_skips_subdirectories() {
        let temp = fixture();
        let files = list_files(temp.path(), &ScanOptions::default()).unwrap();
        assert_eq!(names(&files), vec!["a.log", "b.txt"]);
    }

    #[test]
    fn recursive_listing_with_extension_filter() {
        let temp = fixture();
        let opts = ScanOptions {
            recursive: true,
            extensions: vec![".txt".into()],
            exclude: vec![],
        };
        let files = list_files(temp.path(), &opts).unwrap();
        assert_eq!(names(&files), vec!["b.txt", "c.txt", "d.txt"]);
    }

    #[test]
    fn excluded_directories_are_not_descended() {
        let temp = fixture();
        let opts = ScanOptions {
            recursive: true,
            extensions: vec![],
            exclude: vec!["deeper".into()],
        };
        let files = list_files(temp.path(), &opts).unwrap();
        assert_eq!(names(&files), vec!["a.log", "b.txt", "c.txt"]);
    }

    #[test]
    fn file_path_is_not_a_directory() {
        let temp = fixture();
        let err = list_files(&temp.path().join("b.txt"), &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }
}
