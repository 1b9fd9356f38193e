//! monorepo-dep-doctor - unmaintained dependency reporting for monorepos.
//!
//! CLI entry point.

use clap::Parser;
use monorepo_dep_doctor::notify::ConsoleOutput;
use monorepo_dep_doctor::oracle::DepDoctor;
use monorepo_dep_doctor::{Config, Scanner};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging; stdout is reserved for findings
    let filter = if config.verbose {
        EnvFilter::new("monorepo_dep_doctor=debug,info")
    } else {
        EnvFilter::new("monorepo_dep_doctor=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let scan_config = config.scan_config();
    debug!("Scan configuration: {:?}", scan_config);

    let console = Arc::new(ConsoleOutput::new(config.format, config.quiet));
    let scanner = Scanner::new(
        scan_config,
        Arc::new(DepDoctor::new(&config.oracle)),
        console.clone(),
    );

    let report = match scanner.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    console.print_summary(&report);

    if let Err(e) = report.ensure_success() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
