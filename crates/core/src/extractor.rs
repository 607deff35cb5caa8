use crate::error::{Error, Result};
use crate::scanner::{self, ScanOptions};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

const EMAIL_CORE: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_CORE).expect("email pattern compiles"));

static EMAIL_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^(?:{EMAIL_CORE})$")).expect("email pattern compiles"));

/// Pulls email addresses out of text, files and directories.
///
/// Every call returns its own deduplicated list in first-seen order. The
/// extractor also remembers every address it has produced since the last
/// [`clear_cache`](Self::clear_cache).
#[derive(Debug, Default)]
pub struct EmailExtractor {
    case_sensitive: bool,
    seen: HashSet<String>,
}

impl EmailExtractor {
    pub fn new(case_sensitive: bool) -> Self {
        EmailExtractor {
            case_sensitive,
            seen: HashSet::new(),
        }
    }

    pub fn extract_from_text(&mut self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let mut unique = HashSet::new();
        let mut emails = Vec::new();
        for m in EMAIL_PATTERN.find_iter(text) {
            let email = if self.case_sensitive {
                m.as_str().to_string()
            } else {
                m.as_str().to_lowercase()
            };
            if unique.insert(email.clone()) {
                self.seen.insert(email.clone());
                emails.push(email);
            }
        }
        emails
    }

    pub fn extract_from_file(&mut self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
            _ => Error::io(path, e),
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let emails = self.extract_from_text(&text);
        debug!("{}: {} email(s)", path.display(), emails.len());
        Ok(emails)
    }

    /// Extracts from each file in order, skipping files that cannot be read.
    pub fn extract_from_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<String> {
        let mut unique = HashSet::new();
        let mut emails = Vec::new();
        for path in paths {
            let found = match self.extract_from_file(path.as_ref()) {
                Ok(found) => found,
                Err(e) => {
                    warn!("Skipping {}: {}", path.as_ref().display(), e);
                    continue;
                }
            };
            for email in found {
                if unique.insert(email.clone()) {
                    emails.push(email);
                }
            }
        }
        emails
    }

    pub fn extract_from_directory(&mut self, dir: &Path, opts: &ScanOptions) -> Result<Vec<String>> {
        let files: Vec<PathBuf> = scanner::list_files(dir, opts)?;
        Ok(self.extract_from_files(&files))
    }

    /// Every address seen since the cache was last cleared, sorted.
    pub fn all_extracted(&self) -> Vec<String> {
        let mut all: Vec<String> = self.seen.iter().cloned().collect();
        all.sort();
        all
    }

    pub fn clear_cache(&mut self) {
        self.seen.clear();
    }

    /// True when the whole string is a single address.
    pub fn validate_email(&self, email: &str) -> bool {
        validate_email(email)
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_EXACT.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
