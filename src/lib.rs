//! monorepo-dep-doctor - unmaintained dependency reporting for monorepos.
//!
//! This library scans a tree of independently-versioned projects and reports
//! libraries flagged as unmaintained or archived by an external diagnostic
//! oracle (`dep-doctor`), by:
//! - Discovering every lock file below a root
//! - Running the oracle on each one, with bounded concurrency
//! - Classifying the oracle's output lines
//! - Dropping findings suppressed by the `app,library` ignore policy
//! - Keeping only libraries the project declares directly
//!
//! # Example
//!
//! ```no_run
//! use monorepo_dep_doctor::notify::{ConsoleOutput, OutputFormat};
//! use monorepo_dep_doctor::oracle::DepDoctor;
//! use monorepo_dep_doctor::{ScanConfig, Scanner};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = Scanner::new(
//!         ScanConfig::default(),
//!         Arc::new(DepDoctor::default()),
//!         Arc::new(ConsoleOutput::new(OutputFormat::Csv, false)),
//!     );
//!     let report = scanner.run().await.unwrap();
//!     println!("{} findings", report.findings);
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod ignore;
pub mod notify;
pub mod oracle;
pub mod parser;
pub mod scanner;
pub mod types;

pub use config::{Config, ScanConfig};
pub use ignore::{IgnoreRule, IgnoreRuleSet};
pub use scanner::Scanner;
pub use types::{
    Advisory, AdvisoryLine, DoctorError, Finding, MaintenanceStatus, ManifestLocation, Result,
    ScanError, ScanReport, ScanResult,
};
