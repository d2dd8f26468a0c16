//! Source file discovery

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A discovered source file and its modification time
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Resolves which source file a sync pass should read
#[derive(Debug, Clone)]
pub struct SourceResolver {
    scan_directory: PathBuf,
    file_pattern: String,
}

impl SourceResolver {
    pub fn new(scan_directory: impl Into<PathBuf>, file_pattern: impl Into<String>) -> Self {
        Self {
            scan_directory: scan_directory.into(),
            file_pattern: file_pattern.into(),
        }
    }

    /// Resolve an explicitly given file, or fall back to the newest match
    /// in the scan directory
    pub fn resolve(&self, explicit: Option<&Path>) -> Result<Option<ResolvedSource>> {
        match explicit {
            Some(path) => self.resolve_explicit(path),
            None => self.find_latest(),
        }
    }

    fn resolve_explicit(&self, path: &Path) -> Result<Option<ResolvedSource>> {
        if !path.is_file() {
            log::warn!("source file {} does not exist", path.display());
            return Ok(None);
        }
        let modified = fs::metadata(path)?.modified()?;
        Ok(Some(ResolvedSource {
            path: path.to_path_buf(),
            modified,
        }))
    }

    /// Newest file matching the pattern in the scan directory
    ///
    /// A missing directory is created so the operator can drop files into
    /// it later; until then the scan resolves to none.
    pub fn find_latest(&self) -> Result<Option<ResolvedSource>> {
        if !self.scan_directory.exists() {
            fs::create_dir_all(&self.scan_directory)?;
            log::info!("created scan directory {}", self.scan_directory.display());
            return Ok(None);
        }

        let mut latest: Option<ResolvedSource> = None;
        for entry in WalkDir::new(&self.scan_directory).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !pattern_matches(&self.file_pattern, &name) {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            let is_newer = latest
                .as_ref()
                .map(|current| modified > current.modified)
                .unwrap_or(true);
            if is_newer {
                latest = Some(ResolvedSource {
                    path: entry.path().to_path_buf(),
                    modified,
                });
            }
        }

        match &latest {
            Some(found) => log::info!("latest source file: {}", found.path.display()),
            None => log::warn!(
                "no files matching '{}' in {}",
                self.file_pattern,
                self.scan_directory.display()
            ),
        }

        Ok(latest)
    }
}

/// Wildcard match where `*` spans any run of characters
///
/// Covers patterns like `*.csv` or `export_*.csv`; a pattern without `*`
/// must equal the whole file name. Case-sensitive.
pub fn pattern_matches(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }

    let mut pos = 0usize;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !name.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == parts.len() - 1 {
            let rest = &name[pos..];
            if rest.len() < part.len() || !rest.ends_with(part) {
                return false;
            }
        } else {
            match name[pos..].find(part) {
                Some(found) => pos += found + part.len(),
                None => return false,
            }
        }
    }
    true
}
