//! Result and diagnostic reporting.
//!
//! Reporters are shared by every in-flight manifest scan, so implementations
//! must tolerate concurrent calls.

mod collect;
mod console;

pub use collect::CollectingReporter;
pub use console::{ConsoleOutput, OutputFormat};

use crate::types::ScanResult;
use std::path::Path;

/// Sink for confirmed findings and oracle diagnostics.
pub trait Reporter: Send + Sync {
    /// A confirmed finding, emitted as soon as it is known.
    fn finding(&self, result: &ScanResult);

    /// An `[error]` line from the oracle while diagnosing `manifest`.
    fn oracle_error(&self, manifest: &Path, line: &str);
}
