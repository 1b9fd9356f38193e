//! Configuration handling for the scanner.

use crate::notify::OutputFormat;
use crate::oracle::{Reduction, DEFAULT_ORACLE};
use clap::Parser;
use std::path::PathBuf;

/// Concurrency used when none (or an unusable value) is configured.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Reports unmaintained and archived direct dependencies across a monorepo.
#[derive(Parser, Debug, Clone)]
#[command(name = "monorepo-dep-doctor")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Directory to search for lock files
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Lock file name, matched at any depth
    #[arg(long, default_value = "Gemfile.lock")]
    pub lock_file: String,

    /// Direct-dependency manifest next to each lock file
    #[arg(long, default_value = "Gemfile")]
    pub direct_file: String,

    /// Package manager identifier passed to the oracle
    #[arg(long, default_value = "bundler")]
    pub package_manager: String,

    /// Ignore policy file (`app,library` per line)
    #[arg(long, default_value = ".dep-doctor-ignore")]
    pub ignore_file: PathBuf,

    /// Oracle executable
    #[arg(long, env = "DEP_DOCTOR_BIN", default_value = DEFAULT_ORACLE)]
    pub oracle: PathBuf,

    /// Maximum number of concurrent oracle runs
    #[arg(long, env = "MAX_CONCURRENCY")]
    pub concurrency: Option<String>,

    /// Lock file line where the diagnosed section starts
    #[arg(long)]
    pub section_marker: Option<String>,

    /// Suffix marking pinned entries to drop from the diagnosed section
    #[arg(long, requires = "section_marker")]
    pub pinned_suffix: Option<String>,

    /// Output format for findings
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: suppress oracle diagnostics and the summary line
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Config {
    /// Resolve into the values the scanner runs with.
    pub fn scan_config(&self) -> ScanConfig {
        let reduction = match &self.section_marker {
            Some(marker) => Some(Reduction::new(
                marker.clone(),
                self.pinned_suffix.clone().unwrap_or_default(),
            )),
            None => Reduction::for_package_manager(&self.package_manager),
        };

        ScanConfig {
            root: self.root.clone(),
            lock_file: self.lock_file.clone(),
            direct_file: self.direct_file.clone(),
            package_manager: self.package_manager.clone(),
            ignore_file: self.ignore_file.clone(),
            concurrency: resolve_concurrency(self.concurrency.as_deref()),
            reduction,
        }
    }
}

/// Everything one scan run needs. Built once and passed in explicitly.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub root: PathBuf,
    pub lock_file: String,
    pub direct_file: String,
    pub package_manager: String,
    pub ignore_file: PathBuf,
    pub concurrency: usize,
    pub reduction: Option<Reduction>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            lock_file: "Gemfile.lock".to_string(),
            direct_file: "Gemfile".to_string(),
            package_manager: "bundler".to_string(),
            ignore_file: PathBuf::from(".dep-doctor-ignore"),
            concurrency: DEFAULT_CONCURRENCY,
            reduction: Reduction::for_package_manager("bundler"),
        }
    }
}

/// Parse a concurrency setting, falling back to [`DEFAULT_CONCURRENCY`]
/// when it is unset, not an integer, or not positive.
pub fn resolve_concurrency(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_CONCURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_concurrency() {
        assert_eq!(resolve_concurrency(None), DEFAULT_CONCURRENCY);
        assert_eq!(resolve_concurrency(Some("4")), 4);
        assert_eq!(resolve_concurrency(Some(" 32 ")), 32);
        assert_eq!(resolve_concurrency(Some("0")), DEFAULT_CONCURRENCY);
        assert_eq!(resolve_concurrency(Some("-3")), DEFAULT_CONCURRENCY);
        assert_eq!(resolve_concurrency(Some("many")), DEFAULT_CONCURRENCY);
        assert_eq!(resolve_concurrency(Some("")), DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["monorepo-dep-doctor"]).unwrap();
        let scan = config.scan_config();
        assert_eq!(scan.lock_file, "Gemfile.lock");
        assert_eq!(scan.direct_file, "Gemfile");
        assert_eq!(scan.package_manager, "bundler");
        assert_eq!(scan.reduction, Some(Reduction::new("DEPENDENCIES", "!")));
        assert_eq!(config.format, OutputFormat::Csv);
    }

    #[test]
    fn test_other_package_manager_has_no_reduction() {
        let config = Config::try_parse_from([
            "monorepo-dep-doctor",
            "--package-manager",
            "npm",
            "--lock-file",
            "package-lock.json",
            "--direct-file",
            "package.json",
        ])
        .unwrap();
        let scan = config.scan_config();
        assert!(scan.reduction.is_none());
        assert_eq!(scan.lock_file, "package-lock.json");
    }

    #[test]
    fn test_explicit_reduction() {
        let config = Config::try_parse_from([
            "monorepo-dep-doctor",
            "--section-marker",
            "packages:",
            "--pinned-suffix",
            "(local)",
            "--concurrency",
            "3",
        ])
        .unwrap();
        let scan = config.scan_config();
        assert_eq!(scan.reduction, Some(Reduction::new("packages:", "(local)")));
        assert_eq!(scan.concurrency, 3);
    }
}
