//! Core library for the driftfix source-rewriting tool.
//!
//! driftfix repairs call sites whose shape (a record construction, a method
//! invocation, a chained accessor) has drifted out of sync with an evolving
//! API, by applying an ordered list of structural find/replace rules to each
//! file's full text. It never parses the host language; patterns only need
//! to recognize the construct they fix.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the rewriting engine: patterns, rules, and the
/// sequential rewriter. This is the core; it does no I/O.
pub mod rewrite;

/// Module for loading declarative rule sets from TOML.
pub mod config;

/// Module defining the command-line interface arguments.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module for rich CLI output formatting with colored text and progress
/// reporting.
pub mod output;

/// Module containing utility functions shared across the CLI layer.
pub mod utils;
