//! Main binary entry point for the `driftfix` source-rewriting tool.
//!
//! This binary simply delegates to the shared `commands::run_with_args()`
//! function so the CLI behaves identically when driven from tests.

use anyhow::Result;

fn main() -> Result<()> {
    let code = driftfix::commands::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
