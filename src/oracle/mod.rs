//! Maintenance-diagnostic oracle invocation.
//!
//! The oracle (`dep-doctor` by default) is an external process. Its exit
//! status is not inspected: it exits non-zero on rate limiting and on
//! unresolvable source URLs, both of which it already reports as `[error]`
//! lines. Only a failure to start the process is an error here.

pub mod lockfile;

pub use lockfile::{prepare, PreparedInput, Reduction};

use crate::types::{DoctorError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default oracle executable.
pub const DEFAULT_ORACLE: &str = "dep-doctor";

/// One oracle request.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// File handed to the oracle (possibly a reduced copy).
    pub input: &'a Path,
    pub package_manager: &'a str,
    /// Space-separated libraries the oracle may skip.
    pub ignore_hint: &'a str,
}

/// Runs the oracle and returns its captured standard output.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn diagnose(&self, invocation: Invocation<'_>) -> std::io::Result<Vec<u8>>;
}

/// The `dep-doctor diagnose` command line tool.
#[derive(Debug, Clone)]
pub struct DepDoctor {
    program: PathBuf,
}

impl DepDoctor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, invocation: &Invocation<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("diagnose")
            .arg("--file")
            .arg(invocation.input)
            .arg("--package")
            .arg(invocation.package_manager)
            .arg("--ignores")
            .arg(invocation.ignore_hint)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Default for DepDoctor {
    fn default() -> Self {
        Self::new(DEFAULT_ORACLE)
    }
}

#[async_trait]
impl Oracle for DepDoctor {
    async fn diagnose(&self, invocation: Invocation<'_>) -> std::io::Result<Vec<u8>> {
        let output = self.command(&invocation).output().await?;

        if !output.status.success() {
            debug!(
                "{} exited with {} for {}",
                self.program.display(),
                output.status,
                invocation.input.display()
            );
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("oracle stderr: {}", line);
        }

        Ok(output.stdout)
    }
}

/// Prepare the input for `manifest` and run the oracle against it.
///
/// Any reduced copy is removed before this returns, whatever the outcome.
pub async fn invoke(
    oracle: &dyn Oracle,
    manifest: &Path,
    package_manager: &str,
    ignore_hint: &str,
    reduction: Option<&Reduction>,
) -> Result<Vec<u8>> {
    let invocation_error = |source: std::io::Error| DoctorError::Invocation {
        manifest: manifest.to_path_buf(),
        source,
    };

    let input = prepare(manifest, reduction).await.map_err(|e| match e {
        DoctorError::IoError(source) => invocation_error(source),
        other => other,
    })?;

    oracle
        .diagnose(Invocation {
            input: input.path(),
            package_manager,
            ignore_hint,
        })
        .await
        .map_err(invocation_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the file it was given and whether it existed at call time.
    #[derive(Default)]
    struct RecordingOracle {
        seen: Mutex<Vec<(PathBuf, bool, String)>>,
    }

    #[async_trait]
    impl Oracle for RecordingOracle {
        async fn diagnose(&self, invocation: Invocation<'_>) -> std::io::Result<Vec<u8>> {
            let content = std::fs::read_to_string(invocation.input).unwrap_or_default();
            self.seen.lock().unwrap().push((
                invocation.input.to_path_buf(),
                invocation.input.exists(),
                content,
            ));
            Ok(b"[warning] rack (archived): https://example.com/rack\n".to_vec())
        }
    }

    #[tokio::test]
    async fn test_invoke_passes_reduced_copy_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Gemfile.lock");
        std::fs::write(&manifest, "GEM\n  specs:\n    a (1.0)\n\nDEPENDENCIES\n  a\n  b!\n").unwrap();

        let oracle = RecordingOracle::default();
        let reduction = Reduction::for_package_manager("bundler");
        let out = invoke(&oracle, &manifest, "bundler", "", reduction.as_ref())
            .await
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("rack"));

        let seen = oracle.seen.lock().unwrap();
        let (path, existed, content) = &seen[0];
        assert!(*existed);
        assert_ne!(path, &manifest);
        assert_eq!(content, "DEPENDENCIES\n  a\n");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_program_is_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("Gemfile.lock");
        std::fs::write(&manifest, "DEPENDENCIES\n  rack\n").unwrap();

        let oracle = DepDoctor::new(dir.path().join("no-such-oracle"));
        let err = invoke(&oracle, &manifest, "bundler", "", None).await.unwrap_err();
        match err {
            DoctorError::Invocation { manifest: m, .. } => assert_eq!(m, manifest),
            other => panic!("expected invocation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_manifest_is_invocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = RecordingOracle::default();
        let reduction = Reduction::for_package_manager("bundler");
        let err = invoke(
            &oracle,
            &dir.path().join("Gemfile.lock"),
            "bundler",
            "",
            reduction.as_ref(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DoctorError::Invocation { .. }));
        assert!(oracle.seen.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-doctor");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"[error] rate limited\"\necho \"[warning] rack (archived): https://example.com/rack\"\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let manifest = dir.path().join("Gemfile.lock");
        std::fs::write(&manifest, "DEPENDENCIES\n  rack\n").unwrap();

        let oracle = DepDoctor::new(&script);
        let out = invoke(&oracle, &manifest, "bundler", "", None).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[error] rate limited"));
        assert!(text.contains("rack (archived)"));
    }
}
