use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

use crate::rewrite::RuleReport;

/// Totals for one run, printed as the closing summary line.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    /// Files whose text changed (or would change under `--check`).
    pub changed: usize,
    /// Files left byte-for-byte identical.
    pub unchanged: usize,
    /// Files that could not be read or written.
    pub failed: usize,
    /// Total occurrences replaced across all files and rules.
    pub replacements: usize,
}

/// Create a progress bar spanning the target file list.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
///
/// # Panics
///
/// Panics if the progress style template is invalid (should never happen with hardcoded template).
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    // In test mode, return a hidden progress bar to avoid polluting test output
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("rewriting...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick(); // Force initial draw
    pb
}

/// Print the status line for one processed file.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_status(
    writer: &mut impl Write,
    file: &str,
    replacements: usize,
    check: bool,
) -> std::io::Result<()> {
    if replacements == 0 {
        writeln!(writer, "{} {}", "Unchanged".dimmed(), file.dimmed())
    } else {
        let noun = if replacements == 1 {
            "replacement"
        } else {
            "replacements"
        };
        let detail = format!("({replacements} {noun})");
        if check {
            writeln!(
                writer,
                "{} {} {}",
                "Would fix".yellow().bold(),
                file,
                detail.dimmed()
            )
        } else {
            writeln!(
                writer,
                "{} {}",
                format!("Fixed {file}").green().bold(),
                detail.dimmed()
            )
        }
    }
}

/// Print the failure line for one file that could not be processed.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_error(
    writer: &mut impl Write,
    file: &str,
    error: &anyhow::Error,
) -> std::io::Result<()> {
    writeln!(writer, "{} {}: {error:#}", "Failed".red().bold(), file)
}

/// Print the per-rule match-count table for one file.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_rule_table(writer: &mut impl Write, reports: &[RuleReport]) -> std::io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rule", "Matches"]);
    for report in reports {
        table.add_row(vec![
            Cell::new(&report.rule_id),
            Cell::new(report.count),
        ]);
    }
    writeln!(writer, "{table}")
}

/// Print the closing summary line.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary(
    writer: &mut impl Write,
    summary: &RunSummary,
    check: bool,
) -> std::io::Result<()> {
    let changed_label = if check {
        format!("{} would change", summary.changed)
    } else {
        format!("{} fixed", summary.changed)
    };
    let changed = if summary.changed > 0 {
        if check {
            changed_label.yellow().bold()
        } else {
            changed_label.green().bold()
        }
    } else {
        changed_label.dimmed()
    };
    let failed_label = format!("{} failed", summary.failed);
    let failed = if summary.failed > 0 {
        failed_label.red().bold()
    } else {
        failed_label.dimmed()
    };
    writeln!(
        writer,
        "\n{changed} | {} | {failed} | {} total replacements",
        format!("{} unchanged", summary.unchanged).dimmed(),
        summary.replacements
    )
}
