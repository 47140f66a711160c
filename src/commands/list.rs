//! # List Command Implementation
//!
//! This module implements the `list` subcommand and the `--list` flag. It
//! builds the inventory from the configured source and prints the dynamic
//! inventory document Ansible reads:
//!
//! ```json
//! {
//!   "_meta": {"hostvars": {"1296269": {"ansible_host": "localhost", "...": "..."}}},
//!   "all": {"children": ["main_svc", "team_platform", "unassigned"]},
//!   "team_platform": {"hosts": ["1296269"]}
//! }
//! ```

use anyhow::Result;
use clap::Args;
use log::info;

use super::{build_inventory, print_json};
use crate::cli::GlobalArgs;

/// Print the whole inventory as JSON
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let inventory = build_inventory(global)?;
    info!(
        "Inventory has {} hosts in {} groups",
        inventory.host_count(),
        inventory.group_count()
    );
    print_json(&inventory.to_list_json()?, args.pretty)
}
