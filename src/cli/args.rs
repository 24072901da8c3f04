//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::UnknownParentPolicy;

/// Browse and extend the SDS location hierarchy
#[derive(Parser, Debug)]
#[command(name = "sdsloc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file layered over the global config
    #[arg(long, global = true, env = "SDSLOC_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Seed file with the location forest (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the location hierarchy as a tree
    Tree {
        /// Case-insensitive name filter
        #[arg(short, long)]
        filter: Option<String>,
        /// Drop branches without matches instead of highlighting
        #[arg(long)]
        prune: bool,
        /// Mark this location as selected
        #[arg(short, long)]
        select: Option<String>,
    },

    /// List locations as a flat table
    Table {
        /// Case-insensitive name filter
        #[arg(short, long)]
        filter: Option<String>,
        /// Only locations below this one
        #[arg(short, long)]
        under: Option<String>,
    },

    /// Show details of a location
    Show {
        /// Location id
        id: String,
    },

    /// Show the breadcrumb trail of a location
    Path {
        /// Location id
        id: String,
        /// Do not collapse long trails
        #[arg(long)]
        full: bool,
    },

    /// Add a location to the in-memory hierarchy and show the result
    Add {
        /// Location name
        name: String,
        /// Parent location id (default: new root)
        #[arg(short, long)]
        parent: Option<String>,
        /// Address
        #[arg(short, long)]
        address: Option<String>,
        /// Override the configured policy for unknown parents
        #[arg(long, value_enum)]
        on_missing_parent: Option<UnknownParentPolicy>,
    },

    /// Show portal dashboard numbers
    Dashboard,

    /// Print the hierarchy as a TOML seed document
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
