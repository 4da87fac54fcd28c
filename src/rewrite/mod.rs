//! Structural rewriting engine.
//!
//! The core of the tool: whitespace-tolerant patterns with named capture
//! slots, rules that pair a matcher with a replacement, and a sequential
//! rewriter that folds an ordered rule list over one text buffer. The engine
//! is configuration-agnostic and does no I/O; callers supply rules built in
//! code or loaded from a rule set file and store the returned text
//! themselves.

mod pattern;
mod rewriter;
mod rule;

pub use pattern::{Captures, Match, Pattern, PatternError};
pub use rewriter::{RewriteResult, RuleReport, Rewriter};
pub use rule::{LiteralEdit, Renderer, ReplaceFn, Rule, RuleOutcome, StructuralRule, Template};
