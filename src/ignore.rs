//! Suppression policy: `app,library` rules with `*` wildcards.
//!
//! ```text
//! # Internal gems
//! api,schema            # detected as unmaintained but vendored
//! *,itunes_receipt_decoder
//! legacy,*
//! ```

use crate::types::{DoctorError, Result};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Pattern that matches any app or library.
pub const WILDCARD: &str = "*";

/// A single `(app, library)` suppression rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IgnoreRule {
    pub app: String,
    pub library: String,
}

impl IgnoreRule {
    pub fn new(app: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            library: library.into(),
        }
    }

    /// Whether this rule suppresses `library` within `app`.
    pub fn matches(&self, app: &str, library: &str) -> bool {
        pattern_matches(&self.app, app) && pattern_matches(&self.library, library)
    }
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    pattern == WILDCARD || pattern == value
}

/// Parsed ignore policy. Read-only once constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRuleSet {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRuleSet {
    pub fn new(rules: Vec<IgnoreRule>) -> Self {
        Self { rules }
    }

    /// Parse policy text. A single malformed line fails the whole parse.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let content = match trimmed.find('#') {
                Some(pos) => trimmed[..pos].trim(),
                None => trimmed,
            };

            let fields: Vec<&str> = content.split(',').map(str::trim).collect();
            match fields.as_slice() {
                [app, library] if !app.is_empty() && !library.is_empty() => {
                    rules.push(IgnoreRule::new(*app, *library));
                }
                _ => {
                    return Err(DoctorError::Policy {
                        line: idx + 1,
                        content: raw.to_string(),
                    });
                }
            }
        }

        Ok(Self { rules })
    }

    /// Load policy from `path`. A missing file is an empty policy.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let rules = Self::parse(&text)?;
                debug!("Loaded {} ignore rules from {}", rules.len(), path.display());
                Ok(rules)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No ignore file at {}, using empty policy", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(DoctorError::PolicyRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// True iff any rule suppresses `library` within `app`.
    pub fn matches(&self, app: &str, library: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(app, library))
    }

    /// Space-separated library names the oracle may skip for `app`.
    ///
    /// Wildcard-library rules name nothing concrete and are left out; those
    /// are still enforced by [`IgnoreRuleSet::matches`] after the oracle runs.
    pub fn oracle_hint(&self, app: &str) -> String {
        let mut names: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if rule.library != WILDCARD
                && pattern_matches(&rule.app, app)
                && !names.contains(&rule.library.as_str())
            {
                names.push(&rule.library);
            }
        }
        names.join(" ")
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for IgnoreRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{},{}", rule.app, rule.library)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FIXTURE: &str = "# Internal gems
api,schema           # Internal gem detection in api
*,itunes_receipt_decoder

# not-maintained
*,json_spec          # Used in api, test
legacy , *
";

    #[test]
    fn test_parse_valid_file() {
        let rules = IgnoreRuleSet::parse(FIXTURE).unwrap();
        assert_eq!(
            rules.rules(),
            &[
                IgnoreRule::new("api", "schema"),
                IgnoreRule::new("*", "itunes_receipt_decoder"),
                IgnoreRule::new("*", "json_spec"),
                IgnoreRule::new("legacy", "*"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_and_comment_only() {
        assert!(IgnoreRuleSet::parse("").unwrap().is_empty());
        assert!(IgnoreRuleSet::parse("\n   \n# just a comment\n  # indented\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_line() {
        match IgnoreRuleSet::parse("invalid") {
            Err(DoctorError::Policy { line, content }) => {
                assert_eq!(line, 1);
                assert_eq!(content, "invalid");
            }
            other => panic!("expected policy error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reports_line_of_every_malformed_position() {
        let good = ["api,schema", "# comment", "", "*,json_spec", "web,*"];
        let bad = ["invalid", "a,b,c", "api,", ",lib", "  ,  # only a comment after"];

        for bad_line in bad {
            for pos in 0..=good.len() {
                let mut lines: Vec<&str> = good.to_vec();
                lines.insert(pos, bad_line);
                let text = lines.join("\n");

                match IgnoreRuleSet::parse(&text) {
                    Err(DoctorError::Policy { line, content }) => {
                        assert_eq!(line, pos + 1, "wrong line for {:?} in {:?}", bad_line, text);
                        assert_eq!(content, bad_line);
                    }
                    other => panic!("expected policy error for {:?}, got {:?}", text, other),
                }
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let rules = IgnoreRuleSet::parse(FIXTURE).unwrap();
        let rendered = rules.to_string();
        assert_eq!(IgnoreRuleSet::parse(&rendered).unwrap(), rules);
    }

    fn arb_pattern() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(WILDCARD.to_string()),
            "[A-Za-z0-9_][A-Za-z0-9_.-]{0,15}",
        ]
    }

    fn arb_rule_set() -> impl Strategy<Value = IgnoreRuleSet> {
        prop::collection::vec((arb_pattern(), arb_pattern()), 0..12).prop_map(|pairs| {
            IgnoreRuleSet::new(
                pairs
                    .into_iter()
                    .map(|(app, library)| IgnoreRule::new(app, library))
                    .collect(),
            )
        })
    }

    proptest! {
        /// Rendering any rule set and parsing it back yields the same rules.
        #[test]
        fn rendered_rule_sets_parse_back(rules in arb_rule_set()) {
            let reparsed = IgnoreRuleSet::parse(&rules.to_string());
            prop_assert_eq!(reparsed.ok(), Some(rules));
        }
    }

    #[test]
    fn test_matches_exhaustive() {
        let rules = IgnoreRuleSet::new(vec![
            IgnoreRule::new("api", "schema"),
            IgnoreRule::new("*", "json_spec"),
            IgnoreRule::new("legacy", "*"),
        ]);

        let apps = ["api", "web", "legacy", "Api", "*"];
        let libs = ["schema", "json_spec", "rails", "Schema", "*"];

        for app in apps {
            for lib in libs {
                let expected = (app == "api" && lib == "schema")
                    || lib == "json_spec"
                    || app == "legacy";
                assert_eq!(rules.matches(app, lib), expected, "matches({}, {})", app, lib);
            }
        }
    }

    #[test]
    fn test_suppression_scopes() {
        let cases = [
            (IgnoreRule::new("myapp", "X"), true),
            (IgnoreRule::new("*", "X"), true),
            (IgnoreRule::new("myapp", "*"), true),
            (IgnoreRule::new("otherapp", "X"), false),
        ];
        for (rule, suppressed) in cases {
            let rules = IgnoreRuleSet::new(vec![rule.clone()]);
            assert_eq!(rules.matches("myapp", "X"), suppressed, "rule {:?}", rule);
        }
    }

    #[test]
    fn test_oracle_hint() {
        let rules = IgnoreRuleSet::parse(FIXTURE).unwrap();
        assert_eq!(rules.oracle_hint("api"), "schema itunes_receipt_decoder json_spec");
        assert_eq!(rules.oracle_hint("web"), "itunes_receipt_decoder json_spec");
        assert_eq!(rules.oracle_hint("legacy"), "itunes_receipt_decoder json_spec");
        assert_eq!(IgnoreRuleSet::default().oracle_hint("api"), "");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rules = IgnoreRuleSet::load(&dir.path().join(".dep-doctor-ignore"))
            .await
            .unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_load_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = IgnoreRuleSet::load(dir.path()).await;
        assert!(matches!(result, Err(DoctorError::PolicyRead { .. })));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".dep-doctor-ignore");
        std::fs::write(&path, "api,schema\nbroken\n").unwrap();
        let result = IgnoreRuleSet::load(&path).await;
        assert!(matches!(result, Err(DoctorError::Policy { line: 2, .. })));
    }
}
