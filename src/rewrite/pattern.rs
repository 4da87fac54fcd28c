//! Whitespace-tolerant structural pattern matching.
//!
//! A pattern is a sequence of fixed anchor fragments interleaved with named
//! capture slots, written as a single string: `$name` (or `${name}`) declares
//! a slot confined to one line, `${name:multiline}` a slot that may span
//! lines, `${name:ws}` a slot matching a whitespace run, and `$$` escapes a
//! literal dollar sign. Whitespace inside an anchor matches any run of
//! whitespace at the call site, so one pattern matches both a compact
//! single-line construct and the same construct formatted vertically with
//! extra indentation. When the replacement must preserve a call site's own
//! layout, capture the whitespace with a `ws` slot and re-emit it.
//!
//! # Usage
//!
//! ```
//! use driftfix::rewrite::Pattern;
//!
//! let pattern = Pattern::parse("TextRun { text: $text }").expect("valid pattern");
//! let matches = pattern.find_all("TextRun {\n    text: \"x\"\n}");
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].captures.get("text"), Some("\"x\""));
//! ```

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::fmt::Write as _;
use thiserror::Error;

/// Error raised while building a pattern, template, literal edit, or rule.
///
/// All variants are detected at construction time; a successfully built rule
/// cannot fail during application.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern contains no anchor text at all.
    #[error("pattern is empty")]
    EmptyPattern,
    /// A `${` slot opener with no closing `}`.
    #[error("unterminated capture slot: missing `}}`")]
    UnterminatedSlot,
    /// A `$` that is not followed by a slot name, `{`, or `$`.
    #[error("capture slot with empty name (use `$$` for a literal dollar)")]
    EmptySlotName,
    /// Slot names are restricted to `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid capture slot name `{0}`")]
    InvalidSlotName(String),
    /// The same slot name was declared twice in one pattern.
    #[error("duplicate capture slot `{0}`")]
    DuplicateSlot(String),
    /// A slot flag other than `multiline` or `ws`.
    #[error("unknown flag `{0}` on capture slot (expected `multiline` or `ws`)")]
    UnknownFlag(String),
    /// A slot without non-whitespace anchor text on both sides. An unbounded
    /// slot has no way to know where its span ends.
    #[error("capture slot `{0}` must have anchor text on both sides")]
    UnanchoredSlot(String),
    /// The replacement template references a slot the pattern never declares.
    #[error("replacement references undeclared slot `{0}`")]
    UnknownSlot(String),
    /// A literal edit with nothing to search for.
    #[error("literal edit with empty search text")]
    EmptyNeedle,
    /// The compiled pattern was rejected by the regex engine.
    #[error("pattern failed to compile: {0}")]
    Regex(#[from] regex::Error),
}

/// What a capture slot is allowed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    /// Shortest span within one line.
    SingleLine,
    /// Shortest span, newlines allowed.
    Multiline,
    /// A run of whitespace, possibly empty. Lets a replacement re-emit the
    /// call site's own indentation.
    Whitespace,
}

/// One parsed piece of a pattern or template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Fixed text that must appear verbatim (modulo whitespace runs).
    Anchor(String),
    /// A named capture slot.
    Slot {
        /// Slot name used for capture lookup and back-references.
        name: String,
        /// What the slot may match.
        kind: SlotKind,
    },
}

/// Splits a pattern or template string into anchors and slots.
///
/// Shared between [`Pattern`] and the replacement template parser; templates
/// only use slot names and ignore the slot kind.
pub(crate) fn parse_segments(input: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut anchor = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            anchor.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                anchor.push('$');
            }
            Some('{') => {
                chars.next();
                let mut body = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    body.push(c);
                }
                if !closed {
                    return Err(PatternError::UnterminatedSlot);
                }
                let (name, flag) = match body.split_once(':') {
                    Some((name, flag)) => (name.to_owned(), Some(flag.to_owned())),
                    None => (body, None),
                };
                let kind = match flag.as_deref() {
                    None => SlotKind::SingleLine,
                    Some("multiline") => SlotKind::Multiline,
                    Some("ws") => SlotKind::Whitespace,
                    Some(other) => return Err(PatternError::UnknownFlag(other.to_owned())),
                };
                flush_anchor(&mut segments, &mut anchor);
                segments.push(Segment::Slot {
                    name: validated_name(name)?,
                    kind,
                });
            }
            _ => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                flush_anchor(&mut segments, &mut anchor);
                segments.push(Segment::Slot {
                    name: validated_name(name)?,
                    kind: SlotKind::SingleLine,
                });
            }
        }
    }
    flush_anchor(&mut segments, &mut anchor);
    Ok(segments)
}

fn flush_anchor(segments: &mut Vec<Segment>, anchor: &mut String) {
    if !anchor.is_empty() {
        segments.push(Segment::Anchor(std::mem::take(anchor)));
    }
}

fn validated_name(name: String) -> Result<String, PatternError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(PatternError::EmptySlotName);
    };
    let head_ok = first.is_ascii_alphabetic() || first == '_';
    if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(PatternError::InvalidSlotName(name));
    }
    Ok(name)
}

/// A compiled structural pattern.
///
/// Built once with [`Pattern::parse`], validated there, and reusable across
/// any number of texts. Matching is non-greedy: each slot captures the
/// shortest span that still lets the next anchor match, so one match never
/// swallows unrelated trailing content, and the regex engine keeps the scan
/// near-linear in the input length.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The original pattern string, kept for display and diagnostics.
    source: String,
    regex: Regex,
    /// Slot names in declaration order.
    slots: Vec<String>,
}

impl Pattern {
    /// Parses and compiles a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the pattern is empty, a slot is
    /// malformed, duplicated, or unanchored, or the compiled form is rejected
    /// by the regex engine. All validation happens here; a built `Pattern`
    /// cannot fail later.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.trim().is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        let segments = parse_segments(pattern)?;

        let mut seen = FxHashSet::default();
        let mut slots = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            let Segment::Slot { name, .. } = segment else {
                continue;
            };
            if !seen.insert(name.clone()) {
                return Err(PatternError::DuplicateSlot(name.clone()));
            }
            slots.push(name.clone());

            // A slot is only bounded if real anchor text surrounds it;
            // whitespace alone cannot terminate a non-greedy capture.
            let anchored = |segment: Option<&Segment>| {
                matches!(segment, Some(Segment::Anchor(a)) if !a.trim().is_empty())
            };
            let before = i.checked_sub(1).and_then(|j| segments.get(j));
            if !anchored(before) || !anchored(segments.get(i + 1)) {
                return Err(PatternError::UnanchoredSlot(name.clone()));
            }
        }

        let regex = Regex::new(&compile(&segments))?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
            slots,
        })
    }

    /// Slot names in declaration order.
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Whether the pattern declares a slot with the given name.
    #[must_use]
    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.iter().any(|slot| slot == name)
    }

    /// Whether the pattern occurs anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Finds every non-overlapping occurrence, leftmost first.
    ///
    /// When two candidate matches would overlap, only the leftmost is kept
    /// and scanning resumes after its end; matches never nest or overlap.
    #[must_use]
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<Match<'t>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let mut values = FxHashMap::default();
                for name in &self.slots {
                    if let Some(m) = caps.name(name) {
                        values.insert(name.clone(), m.as_str());
                    }
                }
                Some(Match {
                    start: whole.start(),
                    end: whole.end(),
                    captures: Captures { values },
                })
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compiles parsed segments into regex source.
fn compile(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Anchor(text) => compile_anchor(text, &mut out),
            Segment::Slot { name, kind } => {
                let _ = write!(out, "(?P<{name}>");
                out.push_str(match kind {
                    SlotKind::SingleLine => ".*?",
                    SlotKind::Multiline => "(?s:.*?)",
                    SlotKind::Whitespace => r"\s*",
                });
                out.push(')');
            }
        }
    }
    out
}

/// Escapes anchor text, turning each whitespace run into a flexible match.
///
/// A run between two word characters becomes `\s+` (so `fn foo` cannot match
/// `fnfoo`); any other run becomes `\s*` (so `{ text` also matches `{text`).
fn compile_anchor(text: &str, out: &mut String) {
    let chars: Vec<char> = text.chars().collect();
    let mut chunk = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let after_word = chunk.chars().next_back().is_some_and(is_word);
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            let before_word = chars.get(i).copied().is_some_and(is_word);
            out.push_str(&regex::escape(&chunk));
            chunk.clear();
            out.push_str(if after_word && before_word {
                r"\s+"
            } else {
                r"\s*"
            });
        } else {
            chunk.push(chars[i]);
            i += 1;
        }
    }
    out.push_str(&regex::escape(&chunk));
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Slot captures for one match: slot name to matched substring.
#[derive(Debug, Default, Clone)]
pub struct Captures<'t> {
    values: FxHashMap<String, &'t str>,
}

impl<'t> Captures<'t> {
    /// Returns the text captured by the named slot, if the slot exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'t str> {
        self.values.get(name).copied()
    }

    /// Number of captured slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no slots were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One occurrence of a pattern in a text.
#[derive(Debug, Clone)]
pub struct Match<'t> {
    /// Start byte offset of the matched span (inclusive).
    pub start: usize,
    /// End byte offset of the matched span (exclusive).
    pub end: usize,
    /// Slot captures for this occurrence.
    pub captures: Captures<'t>,
}
