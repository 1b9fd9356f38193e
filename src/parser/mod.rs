//! Oracle output parsing.
//!
//! The oracle prints human-readable lines, not a versioned format. Lines are
//! classified one at a time:
//! - `[error] ...` lines become [`AdvisoryLine::ErrorNote`]
//! - `<tag> <library> (<status>): <url>` with a known status becomes a warning
//! - everything else, including short or garbled advisory lines, is ignored

pub mod filters;

pub use filters::is_direct_dependency;

use crate::types::{Advisory, AdvisoryLine, MaintenanceStatus};

/// Marker the oracle puts on its own error lines.
pub const ERROR_MARKER: &str = "[error]";

/// Classify a single line of oracle output.
pub fn classify(line: &str) -> AdvisoryLine {
    if line.contains(ERROR_MARKER) {
        return AdvisoryLine::ErrorNote(line.to_string());
    }

    match parse_warning(line) {
        Some(advisory) => AdvisoryLine::Warning(advisory),
        None => AdvisoryLine::Ignored,
    }
}

/// Classify every line of captured output, keeping oracle order.
pub fn classify_output(output: &str) -> Vec<AdvisoryLine> {
    output
        .lines()
        .map(classify)
        .filter(|line| *line != AdvisoryLine::Ignored)
        .collect()
}

fn parse_warning(line: &str) -> Option<Advisory> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }

    let status = parts[2]
        .trim_matches(|c| matches!(c, '(' | ')' | ':'))
        .parse::<MaintenanceStatus>()
        .ok()?;

    Some(Advisory {
        library: parts[1].to_string(),
        status,
        url: parts[3].to_string(),
    })
}
