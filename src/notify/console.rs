//! Console output: records on stdout, diagnostics on stderr.

use super::Reporter;
use crate::types::{ScanError, ScanReport, ScanResult};
use clap::ValueEnum;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Record format on standard output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<dir>/<direct file>,<library>,<status>,<url>`
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

/// Console output handler.
pub struct ConsoleOutput {
    format: OutputFormat,
    quiet: bool,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Render one record without a trailing newline.
    pub fn render(&self, result: &ScanResult) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Csv => Ok(result.to_csv()),
            OutputFormat::Json => serde_json::to_string(result),
        }
    }

    /// Print the run summary and every manifest failure to stderr.
    pub fn print_summary(&self, report: &ScanReport) {
        if !report.errors.is_empty() {
            eprintln!();
            eprintln!("{}", "Errors encountered:".yellow());
            for error in &report.errors {
                print_error(error);
            }
        }

        if self.quiet {
            return;
        }

        let line = format!(
            "Scanned {} manifests, {} findings, {} failed",
            report.manifests,
            report.findings,
            report.errors.len()
        );
        if report.is_success() {
            eprintln!("{} {}", "[*]".bright_blue(), line);
        } else {
            eprintln!("{} {}", "[!]".red().bold(), line);
        }
    }
}

fn print_error(error: &ScanError) {
    eprintln!("  - {}", error.to_string().dimmed());
}

impl Reporter for ConsoleOutput {
    fn finding(&self, result: &ScanResult) {
        let line = match self.render(result) {
            Ok(line) => line,
            Err(e) => {
                warn!("Skipping {} in {}: {}", result.library, result.direct_dependent, e);
                return;
            }
        };
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            warn!("Failed to write result: {}", e);
        }
    }

    fn oracle_error(&self, manifest: &Path, line: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{}: {}", manifest.display().to_string().yellow(), line);
    }
}
