//! Declarative rule sets loaded from TOML.
//!
//! The engine itself is configuration-agnostic; this module is one caller
//! among others, turning a `[[rule]]` array into validated [`Rule`] values.
//! Every entry is built (and therefore validated) up front, so a malformed
//! rule fails the whole load before any file is touched.
//!
//! ```toml
//! files = ["src/email/mbox.rs"]
//!
//! [[rule]]
//! id = "textrun-fields"
//! pattern = 'TextRun { text: ${text:multiline}, style: Default::default() }'
//! replace = 'TextRun { text: ${text}, style: Default::default(), bounds: None }'
//!
//! [[rule]]
//! find = 'addr.address.clone().unwrap_or_default()'
//! replace = 'addr.address.as_ref().map(|a| a.to_string()).unwrap_or_default()'
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rewrite::Rule;

/// Raw deserialized shape of a rule set file.
#[derive(Debug, Deserialize, Default)]
struct RuleSetFile {
    /// Target files used when the caller supplies no paths of its own.
    #[serde(default)]
    files: Vec<PathBuf>,
    /// Rules in application order.
    #[serde(default, rename = "rule")]
    rules: Vec<RuleEntry>,
}

/// One `[[rule]]` entry. Exactly one of `pattern` or `find` must be set.
#[derive(Debug, Deserialize)]
struct RuleEntry {
    /// Diagnostic id; defaults to `rule-N` by position.
    id: Option<String>,
    /// Structural pattern with capture slots.
    pattern: Option<String>,
    /// Exact substring for a literal edit.
    find: Option<String>,
    /// Replacement template (structural) or replacement text (literal).
    replace: String,
}

/// An ordered, validated rule list plus its default target files.
#[derive(Debug)]
pub struct RuleSet {
    /// Target files used when the caller supplies no paths of its own.
    pub files: Vec<PathBuf>,
    /// Rules in application order.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Loads and validates a rule set from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML does not parse,
    /// or any rule entry is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read rule set {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("invalid rule set {}", path.display()))
    }

    /// Parses and validates a rule set from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not parse or any rule entry is
    /// malformed; the error names the offending rule's id.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: RuleSetFile = toml::from_str(raw).context("rule set is not valid TOML")?;
        let mut rules = Vec::with_capacity(file.rules.len());
        for (index, entry) in file.rules.into_iter().enumerate() {
            let id = entry
                .id
                .unwrap_or_else(|| format!("rule-{}", index + 1));
            let rule = match (entry.pattern, entry.find) {
                (Some(pattern), None) => Rule::structural(&id, &pattern, &entry.replace)
                    .with_context(|| format!("rule `{id}` is malformed"))?,
                (None, Some(find)) => Rule::literal(&id, find, entry.replace)
                    .with_context(|| format!("rule `{id}` is malformed"))?,
                (Some(_), Some(_)) => {
                    bail!("rule `{id}` sets both `pattern` and `find`; use exactly one")
                }
                (None, None) => {
                    bail!("rule `{id}` needs either `pattern` or `find`")
                }
            };
            rules.push(rule);
        }
        Ok(Self {
            files: file.files,
            rules,
        })
    }

    /// Whether the rule set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_structural_and_literal_rules() {
        let ruleset = RuleSet::from_toml(
            r#"
files = ["src/a.rs", "src/b.rs"]

[[rule]]
id = "fields"
pattern = 'Run { text: $text }'
replace = 'Run { text: $text, bounds: None }'

[[rule]]
id = "rename"
find = "old()"
replace = "new()"
"#,
        )
        .expect("valid rule set");

        assert_eq!(ruleset.files.len(), 2);
        assert_eq!(ruleset.rules.len(), 2);
        assert_eq!(ruleset.rules[0].id(), "fields");
        assert_eq!(ruleset.rules[1].id(), "rename");
    }

    #[test]
    fn test_rule_ids_default_by_position() {
        let ruleset = RuleSet::from_toml(
            r#"
[[rule]]
find = "a"
replace = "b"
"#,
        )
        .expect("valid rule set");
        assert_eq!(ruleset.rules[0].id(), "rule-1");
    }

    #[test]
    fn test_rule_with_both_matchers_rejected() {
        let err = RuleSet::from_toml(
            r#"
[[rule]]
id = "both"
pattern = "a $x b"
find = "a"
replace = "b"
"#,
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_rule_with_no_matcher_rejected() {
        let err = RuleSet::from_toml(
            r#"
[[rule]]
id = "neither"
replace = "b"
"#,
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("neither"));
    }

    #[test]
    fn test_malformed_pattern_names_the_rule() {
        let err = RuleSet::from_toml(
            r#"
[[rule]]
id = "broken"
pattern = "a ${x"
replace = "b"
"#,
        )
        .expect_err("must fail");
        let chain = format!("{err:#}");
        assert!(chain.contains("rule `broken`"));
        assert!(chain.contains("unterminated"));
    }

    #[test]
    fn test_undeclared_template_slot_fails_the_load() {
        let err = RuleSet::from_toml(
            r#"
[[rule]]
id = "bad-ref"
pattern = "a $x b"
replace = "a $x $y b"
"#,
        )
        .expect_err("must fail");
        assert!(format!("{err:#}").contains("undeclared slot `y`"));
    }

    #[test]
    fn test_empty_rule_set_is_valid() {
        let ruleset = RuleSet::from_toml("").expect("valid rule set");
        assert!(ruleset.is_empty());
        assert!(ruleset.files.is_empty());
    }
}
