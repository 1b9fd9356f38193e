//! In-memory reporter for library callers that post-process results.

use super::Reporter;
use crate::types::ScanResult;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Buffers findings and oracle diagnostics in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    findings: Mutex<Vec<ScanResult>>,
    diagnostics: Mutex<Vec<(PathBuf, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn findings(&self) -> Vec<ScanResult> {
        self.findings.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn diagnostics(&self) -> Vec<(PathBuf, String)> {
        self.diagnostics.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl Reporter for CollectingReporter {
    fn finding(&self, result: &ScanResult) {
        if let Ok(mut findings) = self.findings.lock() {
            findings.push(result.clone());
        }
    }

    fn oracle_error(&self, manifest: &Path, line: &str) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push((manifest.to_path_buf(), line.to_string()));
        }
    }
}
