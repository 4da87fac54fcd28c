//! Sequential rule pipeline over one text buffer.
//!
//! The rewriter owns a file's full text for the duration of one fix
//! operation and folds an ordered rule list over it: each rule sees the
//! output of the previous one, so a rule whose pattern only exists after an
//! earlier rewrite must come later in the list. The rewriter never touches
//! the file system; the caller stores the returned text.
//!
//! # Usage
//!
//! ```
//! use driftfix::rewrite::{Rewriter, Rule};
//!
//! let rules = vec![Rule::literal("rename", "old()", "new()").expect("valid rule")];
//! let result = Rewriter::new("a = old();").apply(&rules);
//! assert_eq!(result.text, "a = new();");
//! assert_eq!(result.reports[0].count, 1);
//! ```

use serde::Serialize;

use crate::rewrite::rule::Rule;

/// Per-rule diagnostic record: how many occurrences a rule replaced.
///
/// `count == 0` is the expected steady state once a file has already been
/// fixed, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    /// Id of the rule this report describes.
    pub rule_id: String,
    /// Number of occurrences replaced by the rule.
    pub count: usize,
}

/// The fully transformed text plus one report per rule, in rule order.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    /// The final text after every rule has been applied.
    pub text: String,
    /// One entry per rule, in application order.
    pub reports: Vec<RuleReport>,
}

impl RewriteResult {
    /// Total occurrences replaced across all rules.
    #[must_use]
    pub fn replacements(&self) -> usize {
        self.reports.iter().map(|report| report.count).sum()
    }
}

/// Applies an ordered rule list to one text buffer.
#[derive(Debug, Clone)]
pub struct Rewriter {
    source: String,
}

impl Rewriter {
    /// Creates a rewriter owning the given source text.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Folds the rules left to right over the text.
    ///
    /// Each rule runs against the current text and its replacement output
    /// becomes the input of the next rule. Rules that match nowhere pass the
    /// text through unchanged and report `count == 0`.
    #[must_use]
    pub fn apply(self, rules: &[Rule]) -> RewriteResult {
        let mut text = self.source;
        let mut reports = Vec::with_capacity(rules.len());
        for rule in rules {
            let outcome = rule.apply(&text);
            reports.push(RuleReport {
                rule_id: rule.id().to_owned(),
                count: outcome.count,
            });
            text = outcome.text;
        }
        RewriteResult { text, reports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(text: &str, rules: &[Rule]) -> RewriteResult {
        Rewriter::new(text).apply(rules)
    }

    #[test]
    fn test_rules_apply_in_order() {
        let rules = vec![
            Rule::literal("a", "one", "two").expect("valid rule"),
            Rule::literal("b", "two", "three").expect("valid rule"),
        ];
        // Rule `b` sees rule `a`'s output, so "one" ends up as "three".
        let result = fix("one", &rules);
        assert_eq!(result.text, "three");
        assert_eq!(result.reports[0].count, 1);
        assert_eq!(result.reports[1].count, 1);
    }

    #[test]
    fn test_order_sensitivity() {
        // `header` rewrites the record header; `tail` only matches the
        // rewritten header shape.
        let header = || {
            Rule::structural("header", "Run { text: $text }", "Run { text: $text, style: s }")
                .expect("valid rule")
        };
        let tail = || {
            Rule::structural(
                "tail",
                "style: s }",
                "style: s, bounds: None }",
            )
            .expect("valid rule")
        };
        let input = "Run { text: t }";

        let forward = fix(input, &[header(), tail()]);
        assert_eq!(forward.text, "Run { text: t, style: s, bounds: None }");
        assert_eq!(forward.reports[1].count, 1);

        let backward = fix(input, &[tail(), header()]);
        assert_eq!(backward.text, "Run { text: t, style: s }");
        assert_eq!(backward.reports[0].count, 0);
    }

    #[test]
    fn test_noop_rule_does_not_halt_the_pipeline() {
        let rules = vec![
            Rule::literal("absent", "missing", "found").expect("valid rule"),
            Rule::literal("present", "x", "y").expect("valid rule"),
        ];
        let result = fix("x", &rules);
        assert_eq!(result.text, "y");
        assert_eq!(result.reports[0].count, 0);
        assert_eq!(result.reports[1].count, 1);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let rules = || {
            vec![
                Rule::structural(
                    "fields",
                    "Run { text: $text, style: Default::default() }",
                    "Run { text: $text, style: Default::default(), bounds: None }",
                )
                .expect("valid rule"),
                Rule::literal(
                    "accessor",
                    "addr.clone().unwrap_or_default()",
                    "addr.as_ref().map(|a| a.to_string()).unwrap_or_default()",
                )
                .expect("valid rule"),
            ]
        };
        let input = "Run { text: t, style: Default::default() }\naddr.clone().unwrap_or_default()";
        let once = fix(input, &rules());
        let twice = fix(&once.text, &rules());
        assert_eq!(once.text, twice.text);
        assert_eq!(twice.replacements(), 0);
    }

    #[test]
    fn test_reports_cover_every_rule_in_order() {
        let rules = vec![
            Rule::literal("first", "a", "b").expect("valid rule"),
            Rule::literal("second", "zzz", "yyy").expect("valid rule"),
        ];
        let result = fix("a", &rules);
        let ids: Vec<&str> = result.reports.iter().map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);
        assert_eq!(result.replacements(), 1);
    }

    #[test]
    fn test_empty_rule_list_returns_text_unchanged() {
        let result = fix("anything", &[]);
        assert_eq!(result.text, "anything");
        assert!(result.reports.is_empty());
    }
}
