use clap::Parser;
use std::path::PathBuf;

/// Help text for the rule set file format, shown at the bottom of --help.
const RULESET_HELP: &str = "\
RULE SET FILE (TOML):
  Rules are applied top to bottom; each rule sees the output of the
  previous one, and re-running a rule set on already-fixed files changes
  nothing.

  files = [\"src/email/mbox.rs\"]   # targets used when no PATHS are given

  [[rule]]
  id = \"textrun-fields\"           # optional, defaults to rule-N
  pattern = 'TextRun { text: ${text:multiline}, style: Default::default() }'
  replace = 'TextRun { text: ${text}, style: Default::default(), bounds: None, char_positions: None }'

  [[rule]]                        # `find` makes an exact literal edit
  find = 'addr.address.clone().unwrap_or_default()'
  replace = 'addr.address.as_ref().map(|a| a.to_string()).unwrap_or_default()'

  In patterns, $name captures within one line, ${name:multiline} may span
  lines, ${name:ws} captures a whitespace run (re-emit it to preserve a
  call site's own indentation), and $$ is a literal dollar. Whitespace in
  a pattern matches any run of whitespace at the call site.
";

/// Structural find/replace for call sites that drifted out of sync with an
/// evolving API shape.
#[derive(Parser, Debug)]
#[command(name = "driftfix", version, about, after_help = RULESET_HELP)]
pub struct Cli {
    /// Target files. When omitted, the rule set's `files` list is used.
    pub paths: Vec<PathBuf>,

    /// Rule set file (TOML).
    #[arg(short = 'r', long, value_name = "FILE")]
    pub rules: PathBuf,

    /// Report files that would change without writing anything.
    /// Exits 1 if any file would change.
    #[arg(short = 'c', long)]
    pub check: bool,

    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Show a per-rule match-count table for every file.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the final summary.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}
