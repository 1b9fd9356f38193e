//! Lock file reduction before handing it to the oracle.
//!
//! A Bundler lock file carries `GIT`, `PATH` and `GEM` source sections ahead
//! of the `DEPENDENCIES` list. Only the list starting at the section marker
//! is kept, and entries ending in the pinned suffix (`!`, a gem sourced from
//! git or a local path) are removed.

use crate::types::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// How to cut a lock file down before diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    /// Line (trimmed) that starts the kept section.
    pub section_marker: String,
    /// Entries whose trimmed text ends with this are dropped.
    pub pinned_suffix: String,
}

impl Reduction {
    pub fn new(section_marker: impl Into<String>, pinned_suffix: impl Into<String>) -> Self {
        Self {
            section_marker: section_marker.into(),
            pinned_suffix: pinned_suffix.into(),
        }
    }

    /// Built-in reduction for a package manager, if it has one.
    pub fn for_package_manager(package_manager: &str) -> Option<Self> {
        match package_manager {
            "bundler" => Some(Self::new("DEPENDENCIES", "!")),
            _ => None,
        }
    }

    /// Reduce `content`, or `None` when the section marker is absent.
    pub fn apply(&self, content: &str) -> Option<String> {
        let mut lines = content.lines();
        let marker = lines.find(|line| line.trim() == self.section_marker)?;

        let mut out = String::with_capacity(content.len());
        out.push_str(marker);
        out.push('\n');

        for line in lines {
            if !self.pinned_suffix.is_empty() && line.trim_end().ends_with(&self.pinned_suffix) {
                continue;
            }
            out.push_str(line);
            out.push('\n');
        }

        Some(out)
    }
}

/// The file actually passed to the oracle.
///
/// When a reduction applies, the reduced copy lives in a temporary directory
/// that is removed when this value is dropped.
#[derive(Debug)]
pub struct PreparedInput {
    path: PathBuf,
    _scratch: Option<TempDir>,
}

impl PreparedInput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Prepare the oracle input for `manifest`.
///
/// The reduced copy keeps the lock file's name.
pub async fn prepare(manifest: &Path, reduction: Option<&Reduction>) -> Result<PreparedInput> {
    let Some(reduction) = reduction else {
        return Ok(raw(manifest));
    };

    let content = tokio::fs::read_to_string(manifest).await?;
    let Some(reduced) = reduction.apply(&content) else {
        debug!(
            "No {} section in {}, using raw file",
            reduction.section_marker,
            manifest.display()
        );
        return Ok(raw(manifest));
    };

    let scratch = tempfile::Builder::new()
        .prefix("monorepo-dep-doctor")
        .tempdir()?;
    let file_name = manifest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "lockfile".into());
    let path = scratch.path().join(file_name);
    tokio::fs::write(&path, reduced).await?;

    Ok(PreparedInput {
        path,
        _scratch: Some(scratch),
    })
}

fn raw(manifest: &Path) -> PreparedInput {
    PreparedInput {
        path: manifest.to_path_buf(),
        _scratch: None,
    }
}
