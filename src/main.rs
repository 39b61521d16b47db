//! venvfind - locate Python virtual environments near a directory
//!
//! venvfind provides:
//! - Nearest-environment resolution with ancestor search and memoization
//! - Two-pass candidate detection (conventional names, then structure)
//! - Direct candidate validation and whole-tree scanning
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod cli;
mod core;
mod resolver;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
