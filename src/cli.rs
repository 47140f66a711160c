//! CLI argument parsing and command dispatch

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;
use repo_inventory::defaults::DEFAULT_SOURCE_FILE;

/// Repository Inventory - Ansible dynamic inventory of GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "repo-inventory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print the whole inventory as JSON (Ansible `--list` contract)
    #[arg(long, conflicts_with = "host")]
    list: bool,

    /// Print the variables of one host as JSON (Ansible `--host` contract)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Options shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the inventory source file
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "REPO_INVENTORY_CONFIG",
        default_value = DEFAULT_SOURCE_FILE
    )]
    pub config: PathBuf,

    /// Ignore cached results and fetch again
    #[arg(long, global = true)]
    pub refresh_cache: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the whole inventory as JSON
    List(commands::list::ListArgs),

    /// Print the variables of one host as JSON
    Host(commands::host::HostArgs),

    /// Manage cached repository lists
    Cache(commands::cache::CacheArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.global)?;

        match self.command {
            Some(Commands::List(args)) => commands::list::execute(args, &self.global),
            Some(Commands::Host(args)) => commands::host::execute(args, &self.global),
            Some(Commands::Cache(args)) => commands::cache::execute(args, &self.global),
            None => match self.host {
                Some(host) => commands::host::execute(commands::host::HostArgs { host }, &self.global),
                None if self.list => commands::list::execute(commands::list::ListArgs::default(), &self.global),
                None => Err(anyhow::anyhow!(
                    "Nothing to do\n\n\
                     hint: Use --list to print the inventory or --host <HOST> for one host\n\
                     hint: Run 'repo-inventory --help' for all commands"
                )),
            },
        }
    }
}

/// Install the process logger. stdout is left for inventory JSON.
fn init_logging(global: &GlobalArgs) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(global.log_level).parse_default_env();

    match &global.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }

    // A logger may already be installed when running under a test harness
    let _ = builder.try_init();
    Ok(())
}
