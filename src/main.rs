//! # Repository Inventory CLI
//!
//! This is the binary entry point for the `repo-inventory` dynamic inventory
//! executable.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the logger.
//! - Executing the appropriate command and translating library errors into
//!   user-friendly output.
//!
//! The pipeline itself lives in the `lib.rs` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
