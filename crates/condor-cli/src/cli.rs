//! CLI argument definitions for Condor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "condor",
    version,
    about = "Conditional module activation and release-line selection",
    long_about = "Condor resolves which modules of an application are active once conditional \
                  dependencies are taken into account, and picks the newest release line whose \
                  members provide a requested set of elements."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the active modules of a descriptor
    Resolve {
        /// Descriptor file (TOML, or JSON with a .json extension)
        file: PathBuf,
        /// Explain why a module is active
        #[arg(long)]
        why: Option<String>,
    },

    /// Select the newest union providing every requested element
    Select {
        /// Descriptor file declaring the unions
        file: PathBuf,
        /// Requested element keys
        #[arg(required = true)]
        elements: Vec<String>,
    },

    /// Print which members and unions provide each element
    Catalog {
        /// Descriptor file declaring the unions
        file: PathBuf,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
