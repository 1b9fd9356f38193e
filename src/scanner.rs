//! Main scanner orchestrating all components.
//!
//! A run goes through discovery, then loads the ignore policy, then fans out
//! over the discovered manifests with at most `concurrency` scans in flight.
//! A manifest that fails is recorded and its siblings keep going; the report
//! is only produced after every manifest has been attempted.

use crate::config::ScanConfig;
use crate::discovery::discover_manifests;
use crate::ignore::IgnoreRuleSet;
use crate::notify::Reporter;
use crate::oracle::{self, Oracle};
use crate::parser::{classify_output, is_direct_dependency};
use crate::types::{
    AdvisoryLine, Finding, ManifestLocation, Result, ScanError, ScanReport, ScanResult,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Main scanner that wires discovery, the oracle, parsing and filtering together.
pub struct Scanner {
    config: ScanConfig,
    oracle: Arc<dyn Oracle>,
    reporter: Arc<dyn Reporter>,
}

impl Scanner {
    /// Create a new scanner with the given configuration.
    pub fn new(config: ScanConfig, oracle: Arc<dyn Oracle>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            config,
            oracle,
            reporter,
        }
    }

    /// Scan every lock file below the configured root.
    ///
    /// Discovery and ignore-policy failures abort the run before any oracle is
    /// started. Per-manifest failures end up in [`ScanReport::errors`].
    pub async fn run(&self) -> Result<ScanReport> {
        let manifests = discover_manifests(&self.config.root, &self.config.lock_file)?;
        let rules = IgnoreRuleSet::load(&self.config.ignore_file).await?;
        info!(
            "Scanning {} manifests with {} ignore rules",
            manifests.len(),
            rules.len()
        );
        Ok(self.scan_manifests(manifests, &rules).await)
    }

    /// Scan an explicit list of manifests against a loaded rule set.
    pub async fn scan_manifests(
        &self,
        manifests: Vec<ManifestLocation>,
        rules: &IgnoreRuleSet,
    ) -> ScanReport {
        let total = manifests.len();
        let concurrency = self.config.concurrency.max(1);

        let outcomes: Vec<std::result::Result<usize, ScanError>> = stream::iter(manifests)
            .map(|manifest| async move {
                self.scan_manifest(&manifest, rules)
                    .await
                    .map_err(|error| ScanError {
                        manifest: manifest.path().to_path_buf(),
                        error,
                    })
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut report = ScanReport {
            manifests: total,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(count) => report.findings += count,
                Err(e) => report.errors.push(e),
            }
        }
        report
    }

    /// Run the full pipeline for one manifest, returning how many results it emitted.
    pub async fn scan_manifest(
        &self,
        manifest: &ManifestLocation,
        rules: &IgnoreRuleSet,
    ) -> Result<usize> {
        debug!("Diagnosing {} (app {})", manifest, manifest.app_name());

        let hint = rules.oracle_hint(manifest.app_name());
        let output = oracle::invoke(
            self.oracle.as_ref(),
            manifest.path(),
            &self.config.package_manager,
            &hint,
            self.config.reduction.as_ref(),
        )
        .await?;

        Ok(self
            .process_output(manifest, &String::from_utf8_lossy(&output), rules)
            .await)
    }

    /// Classify oracle output for `manifest` and emit confirmed findings in order.
    pub async fn process_output(
        &self,
        manifest: &ManifestLocation,
        output: &str,
        rules: &IgnoreRuleSet,
    ) -> usize {
        let findings: Vec<Finding> = classify_output(output)
            .into_iter()
            .filter_map(|line| match line {
                AdvisoryLine::Warning(advisory) => Some(Finding {
                    advisory,
                    manifest: manifest.clone(),
                }),
                AdvisoryLine::ErrorNote(text) => {
                    self.reporter.oracle_error(manifest.path(), &text);
                    None
                }
                AdvisoryLine::Ignored => None,
            })
            .filter(|finding| {
                let suppressed = rules.matches(manifest.app_name(), &finding.advisory.library);
                if suppressed {
                    debug!(
                        "Ignoring {} in {} by policy",
                        finding.advisory.library,
                        manifest.app_name()
                    );
                }
                !suppressed
            })
            .collect();

        if findings.is_empty() {
            return 0;
        }

        let direct_path = manifest.direct_manifest_path(&self.config.direct_file);
        let direct_content = tokio::fs::read_to_string(&direct_path).await;

        let mut emitted = 0;
        for finding in findings {
            let content = match &direct_content {
                Ok(content) => content,
                Err(e) => {
                    warn!(
                        "Cannot read {} to confirm {}: {}",
                        direct_path.display(),
                        finding.advisory.library,
                        e
                    );
                    continue;
                }
            };

            if !is_direct_dependency(&finding.advisory.library, content) {
                debug!(
                    "{} is not a direct dependency of {}",
                    finding.advisory.library,
                    direct_path.display()
                );
                continue;
            }

            let result = ScanResult {
                direct_dependent: finding.manifest.direct_manifest_display(&self.config.direct_file),
                library: finding.advisory.library,
                status: finding.advisory.status,
                url: finding.advisory.url,
            };
            self.reporter.finding(&result);
            emitted += 1;
        }

        emitted
    }
}
