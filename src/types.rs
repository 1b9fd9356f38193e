//! Core types and errors for the monorepo dependency doctor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// App name given to lock files that sit directly under the scan root.
pub const ROOT_APP_NAME: &str = ".";

/// Errors that can occur during a scan.
#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("ignore file line {line}: expected `app,library`, got {content:?}")]
    Policy { line: usize, content: String },

    #[error("failed to read ignore file {path}: {source}")]
    PolicyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest discovery failed: {0}")]
    Discovery(String),

    #[error("oracle invocation failed: {source}")]
    Invocation {
        manifest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{failed} of {total} manifests failed to scan")]
    ScanFailed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, DoctorError>;

/// One discovered dependency lock file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestLocation {
    path: PathBuf,
    app_name: String,
}

impl ManifestLocation {
    /// Create a location from an already-resolved path and app name.
    pub fn new(path: impl Into<PathBuf>, app_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            app_name: app_name.into(),
        }
    }

    /// Build a location from a path relative to the scan root.
    ///
    /// The app name is the first path segment of `relative`; a lock file
    /// directly under the root belongs to [`ROOT_APP_NAME`].
    pub fn from_relative(root: &Path, relative: &Path) -> Self {
        let mut components = relative.components().filter(|c| matches!(c, Component::Normal(_)));
        let first = components.next();
        let app_name = match (first, components.next()) {
            (Some(Component::Normal(segment)), Some(_)) => segment.to_string_lossy().into_owned(),
            _ => ROOT_APP_NAME.to_string(),
        };

        let path = if root == Path::new(".") {
            relative.to_path_buf()
        } else {
            root.join(relative)
        };

        Self { path, app_name }
    }

    /// Path of the lock file itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ignore-rule scope of this manifest.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Directory containing the lock file.
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Sibling direct-dependency manifest (e.g. `Gemfile` next to `Gemfile.lock`).
    pub fn direct_manifest_path(&self, direct_file: &str) -> PathBuf {
        self.directory().join(direct_file)
    }

    /// Direct manifest path as rendered in result records.
    pub fn direct_manifest_display(&self, direct_file: &str) -> String {
        format!("{}/{}", self.directory().display(), direct_file)
    }
}

impl fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Maintenance status reported by the oracle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceStatus {
    /// `not-maintained`
    NotMaintained,
    /// `archived`
    Archived,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::NotMaintained => "not-maintained",
            MaintenanceStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    /// The unrecognised token.
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "not-maintained" => Ok(MaintenanceStatus::NotMaintained),
            "archived" => Ok(MaintenanceStatus::Archived),
            other => Err(other.to_string()),
        }
    }
}

/// Fields extracted from one oracle warning line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub library: String,
    pub status: MaintenanceStatus,
    pub url: String,
}

/// Classification of a single oracle output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryLine {
    /// `<tag> <library> (<status>): <url>`
    Warning(Advisory),
    /// A line carrying the `[error]` marker, kept verbatim.
    ErrorNote(String),
    /// Anything else.
    Ignored,
}

/// An advisory tied to the manifest it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub advisory: Advisory,
    pub manifest: ManifestLocation,
}

/// A confirmed, non-suppressed finding for a direct dependency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanResult {
    /// `<directory>/<direct manifest file name>`
    pub direct_dependent: String,
    pub library: String,
    pub status: MaintenanceStatus,
    pub url: String,
}

impl ScanResult {
    /// Render as a CSV record (no trailing newline).
    pub fn to_csv(&self) -> String {
        format!(
            "{},{},{},{}",
            self.direct_dependent, self.library, self.status, self.url
        )
    }
}

/// A failure scoped to a single manifest.
#[derive(Debug)]
pub struct ScanError {
    pub manifest: PathBuf,
    pub error: DoctorError,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.manifest.display(), self.error)
    }
}

/// Outcome of a complete run.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Number of manifests discovered and attempted.
    pub manifests: usize,
    /// Number of results emitted.
    pub findings: usize,
    /// Manifest-scoped failures.
    pub errors: Vec<ScanError>,
}

impl ScanReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn a report with failures into an aggregate error.
    pub fn ensure_success(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(DoctorError::ScanFailed {
                failed: self.errors.len(),
                total: self.manifests,
            })
        }
    }
}
