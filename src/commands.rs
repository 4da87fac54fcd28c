use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::RuleSet;
use crate::output::{self, RunSummary};
use crate::rewrite::{RuleReport, Rewriter};
use crate::utils::normalize_display_path;

/// Diagnostics for one processed file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Display path of the file.
    pub file: String,
    /// Whether the transformed text differs from what was loaded.
    pub changed: bool,
    /// Total occurrences replaced across all rules.
    pub replacements: usize,
    /// Per-rule match counts, in rule order.
    pub rules: Vec<RuleReport>,
}

/// Diagnostics for one file that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// Display path of the file.
    pub file: String,
    /// Why reading or writing failed.
    pub error: String,
}

/// Output and write-mode switches for [`run_fix`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixOptions {
    /// Report would-be changes without writing anything.
    pub check: bool,
    /// Emit JSON instead of human-readable status lines.
    pub json: bool,
    /// Print a per-rule match-count table for every file.
    pub verbose: bool,
    /// Suppress per-file status lines; keep errors and the summary.
    pub quiet: bool,
}

/// Run driftfix with the given arguments, writing output to stdout.
///
/// # Errors
///
/// Returns an error if the rule set cannot be loaded or output cannot be
/// written. Per-file I/O failures are reported and reflected in the exit
/// code instead.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run driftfix with the given arguments, writing output to the specified
/// writer.
///
/// This is the testable version of [`run_with_args`] that allows output
/// capture.
///
/// # Errors
///
/// Returns an error if the rule set cannot be loaded or output cannot be
/// written.
pub fn run_with_args_to<W: Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["driftfix".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(cli) => cli,
        Err(e) => {
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    // Let clap print help/version as intended, but captured by redirect
                    write!(writer, "{e}")?;
                    writer.flush()?;
                    return Ok(0);
                }
                _ => {
                    eprint!("{e}");
                    return Ok(2);
                }
            }
        }
    };

    let ruleset = RuleSet::load(&cli.rules)?;
    let targets = if cli.paths.is_empty() {
        ruleset.files.clone()
    } else {
        cli.paths.clone()
    };
    if targets.is_empty() {
        bail!(
            "no target files: pass paths on the command line or list them under `files` in {}",
            cli.rules.display()
        );
    }

    let options = FixOptions {
        check: cli.check,
        json: cli.json,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    run_fix(&targets, &ruleset, &options, writer)
}

/// Apply a rule set to each target file and report per-file diagnostics.
///
/// Each file is loaded, transformed fully in memory, and written back only
/// when the text changed and `check` is off, so a write failure can never
/// leave a half-transformed file. A file that fails to read or write is
/// reported and counted but does not stop the remaining files.
///
/// Returns the process exit code: 1 if any file failed, or under `check` if
/// any file would change; 0 otherwise.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn run_fix<W: Write>(
    targets: &[PathBuf],
    ruleset: &RuleSet,
    options: &FixOptions,
    writer: &mut W,
) -> Result<i32> {
    let progress = if options.json || options.quiet {
        ProgressBar::hidden()
    } else {
        output::create_progress_bar(targets.len() as u64)
    };

    let mut results = Vec::with_capacity(targets.len());
    for path in targets {
        let result = fix_file(path, ruleset, options.check);
        progress.inc(1);
        results.push((normalize_display_path(path), result));
    }
    progress.finish_and_clear();

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    let mut summary = RunSummary::default();
    for (file, result) in results {
        match result {
            Ok(report) => {
                if report.changed {
                    summary.changed += 1;
                } else {
                    summary.unchanged += 1;
                }
                summary.replacements += report.replacements;
                reports.push(report);
            }
            Err(error) => {
                summary.failed += 1;
                errors.push((file, error));
            }
        }
    }

    if options.json {
        let error_reports: Vec<ErrorReport> = errors
            .iter()
            .map(|(file, error)| ErrorReport {
                file: file.clone(),
                error: format!("{error:#}"),
            })
            .collect();
        let payload = serde_json::json!({
            "files": reports,
            "errors": error_reports,
        });
        writeln!(writer, "{}", serde_json::to_string_pretty(&payload)?)?;
    } else {
        if !options.quiet {
            for report in &reports {
                output::print_file_status(writer, &report.file, report.replacements, options.check)?;
                if options.verbose {
                    output::print_rule_table(writer, &report.rules)?;
                }
            }
        }
        for (file, error) in &errors {
            output::print_file_error(writer, file, error)?;
        }
        output::print_summary(writer, &summary, options.check)?;
    }

    if summary.failed > 0 || (options.check && summary.changed > 0) {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Fix one file: load, transform in memory, store only if changed.
fn fix_file(path: &Path, ruleset: &RuleSet, check: bool) -> Result<FileReport> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let result = Rewriter::new(source.as_str()).apply(&ruleset.rules);
    let changed = result.text != source;
    if changed && !check {
        fs::write(path, &result.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(FileReport {
        file: normalize_display_path(path),
        changed,
        replacements: result.replacements(),
        rules: result.reports,
    })
}
