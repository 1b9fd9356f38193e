//! Lock file discovery.
//!
//! Walks the working tree below a root and collects every file whose
//! root-relative path matches a recursive glob such as `**/Gemfile.lock`.

use crate::types::{DoctorError, ManifestLocation, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

/// Glob matching `lock_file` at any depth below the root.
pub fn lock_file_pattern(lock_file: &str) -> String {
    format!("**/{}", lock_file)
}

/// Discover all lock files named `lock_file` below `root`.
pub fn discover_manifests(root: &Path, lock_file: &str) -> Result<Vec<ManifestLocation>> {
    discover_with_pattern(root, &lock_file_pattern(lock_file))
}

/// Discover files below `root` whose root-relative path matches `pattern`.
///
/// Zero matches is an empty scan, not an error. Results are sorted by path.
pub fn discover_with_pattern(root: &Path, pattern: &str) -> Result<Vec<ManifestLocation>> {
    let matcher = compile(pattern)?;

    let mut out: Vec<ManifestLocation> = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_skipped_dir(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(DoctorError::Discovery(format!(
                    "cannot read root {}: {}",
                    root.display(),
                    err
                )));
            }
            Err(err) => {
                debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if matcher.is_match(rel) {
            trace!("Matched {}", rel.display());
            out.push(ManifestLocation::from_relative(root, rel));
        }
    }

    out.sort_by(|a, b| a.path().cmp(b.path()));
    debug!("Discovered {} manifests matching {}", out.len(), pattern);
    Ok(out)
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| DoctorError::Discovery(format!("invalid pattern {:?}: {}", pattern, e)))?;
    Ok(glob.compile_matcher())
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| SKIPPED_DIRS.contains(&name))
            .unwrap_or(false)
}
