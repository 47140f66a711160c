//! # Host Command Implementation
//!
//! This module implements the `host` subcommand and the `--host <HOST>` flag,
//! printing the variables of a single host. Ansible only calls it when the
//! `--list` output has no `_meta` section, but it is kept for completeness.
//! An unknown host prints `{}`.

use anyhow::Result;
use clap::Args;
use log::debug;

use super::{build_inventory, print_json};
use crate::cli::GlobalArgs;

/// Print the variables of one host as JSON
#[derive(Args, Debug)]
pub struct HostArgs {
    /// Host key (the repository id)
    #[arg(value_name = "HOST")]
    pub host: String,
}

/// Execute the `host` command.
pub fn execute(args: HostArgs, global: &GlobalArgs) -> Result<()> {
    let inventory = build_inventory(global)?;
    if inventory.host_vars(&args.host).is_none() {
        debug!("Host {} is not in the inventory", args.host);
    }
    print_json(&inventory.host_vars_json(&args.host)?, false)
}
