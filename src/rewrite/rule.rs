//! Rewrite rules: a matcher plus a replacement.
//!
//! A [`Rule`] is an immutable value with two variants behind one
//! `apply(text) -> outcome` capability: [`StructuralRule`] pairs a
//! whitespace-tolerant [`Pattern`] with a renderer, and [`LiteralEdit`] is an
//! exact substring swap for call sites with no structural variability.
//! Rules are validated when built and reusable across files; applying a rule
//! that matches nowhere is a no-op, never an error.

use std::fmt;

use crate::rewrite::pattern::{parse_segments, Captures, Pattern, PatternError, Segment};

/// Replacement function for [`Renderer::Func`].
///
/// Must be pure and total over any capture combination the pattern can
/// produce; a slot is only guaranteed non-empty if the pattern makes it so.
pub type ReplaceFn = Box<dyn Fn(&Captures<'_>) -> String + Send + Sync>;

/// A fixed replacement skeleton with `$slot` back-references.
///
/// Uses the same `$name` / `${name}` / `$$` syntax as patterns. References
/// are checked against the pattern's declared slots when the rule is built.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if a back-reference is malformed.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        Ok(Self {
            segments: parse_segments(template)?,
        })
    }

    /// Slot names referenced by the template.
    pub(crate) fn references(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot { name, .. } => Some(name.as_str()),
            Segment::Anchor(_) => None,
        })
    }

    /// Substitutes captured slot values into the skeleton.
    ///
    /// Inserted verbatim: the renderer never re-indents or reformats.
    /// Preserving surrounding layout is the pattern's job, by capturing and
    /// re-emitting leading whitespace where it matters.
    #[must_use]
    pub fn render(&self, captures: &Captures<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Anchor(text) => out.push_str(text),
                Segment::Slot { name, .. } => {
                    out.push_str(captures.get(name).unwrap_or_default());
                }
            }
        }
        out
    }
}

/// Produces the replacement text for one match.
pub enum Renderer {
    /// A fixed skeleton with `$slot` back-references.
    Template(Template),
    /// A pure function of the capture mapping, for replacements that must
    /// branch on what was captured.
    Func(ReplaceFn),
}

impl Renderer {
    fn render(&self, captures: &Captures<'_>) -> String {
        match self {
            Self::Template(template) => template.render(captures),
            Self::Func(func) => func(captures),
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// A structural pattern plus its renderer.
#[derive(Debug)]
pub struct StructuralRule {
    pattern: Pattern,
    renderer: Renderer,
}

impl StructuralRule {
    /// Builds a structural rule with a template replacement.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownSlot`] if the template references a
    /// slot the pattern does not declare; template references must be a
    /// subset of the pattern's slots.
    pub fn new(pattern: Pattern, template: Template) -> Result<Self, PatternError> {
        for name in template.references() {
            if !pattern.has_slot(name) {
                return Err(PatternError::UnknownSlot(name.to_owned()));
            }
        }
        Ok(Self {
            pattern,
            renderer: Renderer::Template(template),
        })
    }

    /// Builds a structural rule whose replacement is computed by `func`.
    #[must_use]
    pub fn with_func<F>(pattern: Pattern, func: F) -> Self
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            pattern,
            renderer: Renderer::Func(Box::new(func)),
        }
    }

    /// The rule's pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, text: &str) -> RuleOutcome {
        let matches = self.pattern.find_all(text);
        if matches.is_empty() {
            return RuleOutcome {
                count: 0,
                text: text.to_owned(),
            };
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in &matches {
            out.push_str(&text[last..m.start]);
            out.push_str(&self.renderer.render(&m.captures));
            last = m.end;
        }
        out.push_str(&text[last..]);
        RuleOutcome {
            count: matches.len(),
            text: out,
        }
    }
}

/// An exact substring swap: no captures, no whitespace tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralEdit {
    find: String,
    replace: String,
}

impl LiteralEdit {
    /// Builds a literal edit.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::EmptyNeedle`] if `find` is empty.
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Result<Self, PatternError> {
        let find = find.into();
        if find.is_empty() {
            return Err(PatternError::EmptyNeedle);
        }
        Ok(Self {
            find,
            replace: replace.into(),
        })
    }

    fn apply(&self, text: &str) -> RuleOutcome {
        let count = text.matches(self.find.as_str()).count();
        if count == 0 {
            return RuleOutcome {
                count: 0,
                text: text.to_owned(),
            };
        }
        RuleOutcome {
            count,
            text: text.replace(&self.find, &self.replace),
        }
    }
}

/// The outcome of applying one rule to one text snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// How many occurrences were replaced; zero means the text is unchanged.
    pub count: usize,
    /// The resulting text.
    pub text: String,
}

impl RuleOutcome {
    /// Whether the rule matched at least once.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.count > 0
    }
}

/// One transformation: an id for diagnostics plus a matcher and replacement.
#[derive(Debug)]
pub struct Rule {
    id: String,
    body: RuleBody,
}

#[derive(Debug)]
enum RuleBody {
    Literal(LiteralEdit),
    Structural(StructuralRule),
}

impl Rule {
    /// Builds a structural rule from a pattern string and a template string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern or template is malformed or
    /// the template references an undeclared slot.
    pub fn structural(
        id: impl Into<String>,
        pattern: &str,
        template: &str,
    ) -> Result<Self, PatternError> {
        let rule = StructuralRule::new(Pattern::parse(pattern)?, Template::parse(template)?)?;
        Ok(Self {
            id: id.into(),
            body: RuleBody::Structural(rule),
        })
    }

    /// Builds a structural rule whose replacement is computed by `func`.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern is malformed.
    pub fn structural_with<F>(
        id: impl Into<String>,
        pattern: &str,
        func: F,
    ) -> Result<Self, PatternError>
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        Ok(Self {
            id: id.into(),
            body: RuleBody::Structural(StructuralRule::with_func(Pattern::parse(pattern)?, func)),
        })
    }

    /// Builds a literal edit rule.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::EmptyNeedle`] if `find` is empty.
    pub fn literal(
        id: impl Into<String>,
        find: impl Into<String>,
        replace: impl Into<String>,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            id: id.into(),
            body: RuleBody::Literal(LiteralEdit::new(find, replace)?),
        })
    }

    /// The rule's diagnostic id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Applies the rule to a text snapshot, replacing every non-overlapping
    /// occurrence leftmost to rightmost.
    ///
    /// Pure: reads nothing and writes nothing outside the returned outcome.
    /// A rule that matches nowhere returns the text unchanged with
    /// `count == 0`.
    #[must_use]
    pub fn apply(&self, text: &str) -> RuleOutcome {
        match &self.body {
            RuleBody::Literal(edit) => edit.apply(text),
            RuleBody::Structural(rule) => rule.apply(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_substitutes_captures() {
        let rule = Rule::structural("swap", "let $name = $value;", "let $value = $name;")
            .expect("valid rule");
        let outcome = rule.apply("let a = b;");
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.text, "let b = a;");
    }

    #[test]
    fn test_template_dollar_escape_renders_literal_dollar() {
        let rule = Rule::structural("price", "cost = $amount;", "cost = $$$amount;")
            .expect("valid rule");
        let outcome = rule.apply("cost = 42;");
        assert_eq!(outcome.text, "cost = $42;");
    }

    #[test]
    fn test_undeclared_template_slot_rejected_at_build_time() {
        let err = Rule::structural("bad", "a $x b", "a $x $y b").expect_err("must fail");
        assert!(matches!(err, PatternError::UnknownSlot(name) if name == "y"));
    }

    #[test]
    fn test_no_match_is_a_noop_not_an_error() {
        let rule = Rule::structural("none", "Missing { $x }", "$x").expect("valid rule");
        let outcome = rule.apply("nothing relevant here");
        assert_eq!(outcome.count, 0);
        assert!(!outcome.matched());
        assert_eq!(outcome.text, "nothing relevant here");
    }

    #[test]
    fn test_replaces_all_occurrences_in_one_pass() {
        let rule = Rule::structural("wrap", "f($x)", "g($x)").expect("valid rule");
        let outcome = rule.apply("f(1); f(2); f(3);");
        assert_eq!(outcome.count, 3);
        assert_eq!(outcome.text, "g(1); g(2); g(3);");
    }

    #[test]
    fn test_function_renderer_can_branch_on_captures() {
        // Emit a different accessor depending on whether the captured
        // expression already unwraps a default.
        let rule = Rule::structural_with("accessor", "value: $expr,", |captures| {
            let expr = captures.get("expr").unwrap_or_default();
            if expr.ends_with(".unwrap_or_default()") {
                format!("value: {expr},")
            } else {
                format!("value: {expr}.unwrap_or_default(),")
            }
        })
        .expect("valid rule");

        let outcome = rule.apply("value: name.clone(),\nvalue: id.unwrap_or_default(),");
        assert_eq!(outcome.count, 2);
        assert_eq!(
            outcome.text,
            "value: name.clone().unwrap_or_default(),\nvalue: id.unwrap_or_default(),"
        );
    }

    #[test]
    fn test_literal_edit_replaces_every_occurrence() {
        let rule = Rule::literal("rename", "old_name", "new_name").expect("valid rule");
        let outcome = rule.apply("old_name + old_name");
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.text, "new_name + new_name");
    }

    #[test]
    fn test_literal_edit_is_case_sensitive() {
        let rule = Rule::literal("rename", "Name", "Title").expect("valid rule");
        let outcome = rule.apply("name Name NAME");
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.text, "name Title NAME");
    }

    #[test]
    fn test_literal_edit_with_zero_occurrences_is_safe() {
        let rule = Rule::literal("rename", "absent", "present").expect("valid rule");
        let outcome = rule.apply("some text");
        assert_eq!(outcome.count, 0);
        assert_eq!(outcome.text, "some text");
    }

    #[test]
    fn test_empty_needle_rejected() {
        assert!(matches!(
            LiteralEdit::new("", "x"),
            Err(PatternError::EmptyNeedle)
        ));
    }

    #[test]
    fn test_rule_id_is_preserved() {
        let rule = Rule::literal("my-rule", "a", "b").expect("valid rule");
        assert_eq!(rule.id(), "my-rule");
    }
}
